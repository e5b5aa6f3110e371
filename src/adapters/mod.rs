pub mod json;
pub mod test_detector;
