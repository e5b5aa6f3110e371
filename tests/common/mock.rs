//! Mock implementations for integration tests.
#![allow(dead_code)]

use anyhow::{Result, anyhow};
use module_finder::domain::model::{ClassModel, ClassUnit};
use module_finder::domain::ports::ClassModelSource;

/// Mock ClassModelSource serving a fixed class list, or failing when empty-handed.
pub struct MockModelSource {
    classes: Option<Vec<ClassUnit>>,
}

impl MockModelSource {
    pub fn new(classes: Vec<ClassUnit>) -> Self {
        Self {
            classes: Some(classes),
        }
    }

    pub fn failing() -> Self {
        Self { classes: None }
    }
}

impl ClassModelSource for MockModelSource {
    fn load(&self) -> Result<ClassModel> {
        self.classes
            .clone()
            .map(ClassModel::new)
            .ok_or_else(|| anyhow!("mock source has no model"))
    }
}
