use ocr_pipeline_core::contract::ObjectReference;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("object not found")]
    NotFound,
    #[error("{0}")]
    Service(String),
}

pub trait ObjectStore {
    /// Lightweight existence check; must not read the object body.
    fn probe(&self, object: &ObjectReference) -> Result<(), ProbeError>;
}
