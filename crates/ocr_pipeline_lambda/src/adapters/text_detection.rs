use ocr_pipeline_core::contract::{ObjectReference, TextBlock};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DetectionError {
    pub message: String,
}

impl DetectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub trait TextDetector {
    /// Plain text detection on a stored document. Blocks come back in service order.
    fn detect_text(&self, object: &ObjectReference) -> Result<Vec<TextBlock>, DetectionError>;
}
