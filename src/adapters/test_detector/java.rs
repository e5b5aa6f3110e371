use super::{TestDetector, package_segments};
use crate::domain::model::ClassUnit;

/// Java test code detector
///
/// Conventions:
/// - *Test, *Tests, *TestCase classes
/// - *IT failsafe classes, where a lowercase letter precedes `IT` (ServiceIT, not AUDIT)
/// - `test` package segments (src/test/java mirrors the production package, so only
///   an explicit `test` segment is trusted)
pub struct JavaTestDetector;

impl TestDetector for JavaTestDetector {
    fn is_test_class(&self, class: &ClassUnit) -> bool {
        if package_segments(&class.package).any(|s| s == "test") {
            return true;
        }

        let name = class.name.as_str();
        name.ends_with("Test")
            || name.ends_with("Tests")
            || name.ends_with("TestCase")
            || is_integration_test_name(name)
    }

    fn language(&self) -> &str {
        "java"
    }
}

fn is_integration_test_name(name: &str) -> bool {
    name.strip_suffix("IT")
        .and_then(|stem| stem.chars().next_back())
        .is_some_and(|c| c.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_java_test_suffixes() {
        let detector = JavaTestDetector;
        assert!(detector.is_test_class(&ClassUnit::new("ServiceTest")));
        assert!(detector.is_test_class(&ClassUnit::new("ServiceTests")));
        assert!(detector.is_test_class(&ClassUnit::new("ServiceIT")));
        assert!(detector.is_test_class(&ClassUnit::new("ServiceTestCase")));
        assert!(!detector.is_test_class(&ClassUnit::new("Service")));
        assert!(!detector.is_test_class(&ClassUnit::new("IT")));
    }

    #[test]
    fn test_uppercase_it_suffix_is_not_a_test() {
        let detector = JavaTestDetector;
        for name in ["AUDIT", "DEBIT", "KIT", "UNIT"] {
            assert!(!detector.is_test_class(&ClassUnit::new(name)), "{name}");
        }
        assert!(detector.is_test_class(&ClassUnit::new("OrderFlowIT")));
    }

    #[test]
    fn test_detects_java_test_package() {
        let detector = JavaTestDetector;
        assert!(detector.is_test_class(&ClassUnit::new("Fixtures").in_package("com.example.test")));
        assert!(!detector.is_test_class(&ClassUnit::new("Fixtures").in_package("com.example.testing")));
    }

    #[test]
    fn test_language_returns_java() {
        assert_eq!(JavaTestDetector.language(), "java");
    }
}
