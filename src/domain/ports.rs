use crate::domain::model::ClassModel;
use anyhow::Result;

/// Class model source port (implemented by Infrastructure)
pub trait ClassModelSource {
    fn load(&self) -> Result<ClassModel>;
}
