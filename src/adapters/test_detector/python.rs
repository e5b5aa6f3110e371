use super::{TestDetector, package_segments};
use crate::domain::model::ClassUnit;

/// Python test code detector
///
/// Only module paths are trusted: `TestRunner` classes and `latest_test`
/// packages occur in production code.
///
/// Conventions:
/// - tests/ and test/ packages
/// - test_*.py modules
pub struct PythonTestDetector;

impl TestDetector for PythonTestDetector {
    fn is_test_class(&self, class: &ClassUnit) -> bool {
        package_segments(&class.package)
            .any(|s| s == "tests" || s == "test" || s.starts_with("test_"))
    }

    fn language(&self) -> &str {
        "python"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name_alone_is_not_a_test() {
        let detector = PythonTestDetector;
        assert!(!detector.is_test_class(&ClassUnit::new("TestRunner").in_package("junit.runner")));
        assert!(!detector.is_test_class(&ClassUnit::new("TestParser")));
        assert!(!detector.is_test_class(&ClassUnit::new("Parser")));
        assert!(detector.is_test_class(&ClassUnit::new("TestParser").in_package("app.tests")));
    }

    #[test]
    fn test_detects_python_test_modules() {
        let detector = PythonTestDetector;
        assert!(detector.is_test_class(&ClassUnit::new("Helper").in_package("app.tests")));
        assert!(detector.is_test_class(&ClassUnit::new("Helper").in_package("app.test_parser")));
        assert!(!detector.is_test_class(&ClassUnit::new("Ledger").in_package("bank.latest_test")));
        assert!(!detector.is_test_class(&ClassUnit::new("Helper").in_package("app.latest")));
    }

    #[test]
    fn test_language_returns_python() {
        assert_eq!(PythonTestDetector.language(), "python");
    }
}
