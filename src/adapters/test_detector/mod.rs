//! Test class detection adapters
//!
//! Source-model providers usually hand over test classes alongside production code.
//! Test classes call into everything they exercise, which drowns the coupling signal.
//! Every class is analyzed by default; `--exclude-tests` drops the ones these
//! conventions claim.

mod java;
mod python;

pub use java::JavaTestDetector;
pub use python::PythonTestDetector;

use crate::domain::model::ClassUnit;

/// Trait for detecting test classes based on language conventions
pub trait TestDetector: Send + Sync {
    /// Check if a class is test code
    fn is_test_class(&self, class: &ClassUnit) -> bool;

    /// Get the language this detector is for
    fn language(&self) -> &str;
}

/// Multi-language test detector: a class is test code if any convention claims it
pub struct UniversalTestDetector {
    detectors: Vec<Box<dyn TestDetector>>,
}

impl UniversalTestDetector {
    pub fn new() -> Self {
        Self {
            detectors: vec![Box::new(JavaTestDetector), Box::new(PythonTestDetector)],
        }
    }

    pub fn is_test_class(&self, class: &ClassUnit) -> bool {
        self.detectors.iter().any(|d| d.is_test_class(class))
    }
}

impl Default for UniversalTestDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Package segments, split on `.` or `/`.
fn package_segments(package: &str) -> impl Iterator<Item = &str> {
    package.split(['.', '/']).filter(|s| !s.is_empty())
}
