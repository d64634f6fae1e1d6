use ocr_pipeline_core::contract::ObjectReference;
use ocr_pipeline_core::outcome::{
    Outcome, FILE_ACCESS_ERROR_MESSAGE, FILE_NOT_FOUND_MESSAGE, MISSING_FILE_KEY_MESSAGE,
    PROCESSING_ERROR_MESSAGE, STATUS_BAD_REQUEST, STATUS_INTERNAL_ERROR, STATUS_NOT_FOUND,
};
use thiserror::Error;

use crate::adapters::object_store::ProbeError;
use crate::adapters::text_detection::DetectionError;

/// Failures a single invocation can end in. The `Display` text is for logs;
/// callers only ever see [`ExtractionError::public_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("fileKey parameter is required")]
    MissingFileKey,
    #[error("{0} does not exist")]
    NotFound(ObjectReference),
    #[error("failed to access {object}: {detail}")]
    Access {
        object: ObjectReference,
        detail: String,
    },
    #[error("failed to process {object}: {detail}")]
    Processing {
        object: ObjectReference,
        detail: String,
    },
}

impl ExtractionError {
    pub fn from_probe(object: &ObjectReference, error: ProbeError) -> Self {
        match error {
            ProbeError::NotFound => Self::NotFound(object.clone()),
            ProbeError::Service(detail) => Self::Access {
                object: object.clone(),
                detail,
            },
        }
    }

    pub fn from_detection(object: &ObjectReference, error: DetectionError) -> Self {
        Self::Processing {
            object: object.clone(),
            detail: error.message,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingFileKey => STATUS_BAD_REQUEST,
            Self::NotFound(_) => STATUS_NOT_FOUND,
            Self::Access { .. } | Self::Processing { .. } => STATUS_INTERNAL_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingFileKey => MISSING_FILE_KEY_MESSAGE,
            Self::NotFound(_) => FILE_NOT_FOUND_MESSAGE,
            Self::Access { .. } => FILE_ACCESS_ERROR_MESSAGE,
            Self::Processing { .. } => PROCESSING_ERROR_MESSAGE,
        }
    }

    pub fn to_outcome(&self) -> Outcome {
        Outcome::error(self.status_code(), self.public_message())
    }
}
