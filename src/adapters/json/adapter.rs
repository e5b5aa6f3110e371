use crate::domain::model::{ClassModel, ClassModelDocument};
use crate::domain::ports::ClassModelSource;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Class model source backed by a JSON file on disk
pub struct JsonModelSource {
    pub model_path: PathBuf,
}

impl JsonModelSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            model_path: path.as_ref().to_path_buf(),
        }
    }
}

impl ClassModelSource for JsonModelSource {
    fn load(&self) -> Result<ClassModel> {
        let content = std::fs::read_to_string(&self.model_path).with_context(|| {
            format!("Failed to read class model: {}", self.model_path.display())
        })?;
        let model = parse_model(&content).with_context(|| {
            format!("Failed to parse class model: {}", self.model_path.display())
        })?;

        info!(
            path = %self.model_path.display(),
            classes = model.len(),
            methods = model.method_count(),
            "class model loaded"
        );
        Ok(model)
    }
}

/// Parse a class model document from JSON text.
pub fn parse_model(json: &str) -> Result<ClassModel> {
    let doc: ClassModelDocument =
        serde_json::from_str(json).context("Invalid class model JSON")?;
    Ok(ClassModel::from(doc))
}
