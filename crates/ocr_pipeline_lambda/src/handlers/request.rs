use ocr_pipeline_core::contract::{ExtractionResult, ObjectReference};
use ocr_pipeline_core::outcome::Outcome;
use serde_json::Value;

use crate::adapters::object_store::ObjectStore;
use crate::adapters::text_detection::TextDetector;
use crate::config::HandlerConfig;
use crate::error::ExtractionError;
use crate::handlers::extract_text;

pub const FILE_KEY_PARAMETER: &str = "fileKey";

/// Synchronous API Gateway invocation: `GET ?fileKey=<key>`.
///
/// Missing key → 400, absent object → 404, probe failure → 500, detection
/// failure → 500. Every response carries the JSON and CORS headers.
pub fn handle_extraction_request(
    request: &Value,
    config: &HandlerConfig,
    store: &dyn ObjectStore,
    detector: &dyn TextDetector,
) -> Outcome {
    let outcome = match extract_requested_file(request, config, store, detector) {
        Ok(result) => Outcome::extracted(&result),
        Err(error) => {
            log_request_failure(&error);
            error.to_outcome()
        }
    };

    tracing::info!(
        component = "request_handler",
        event = "request_completed",
        status = outcome.status,
    );
    outcome.with_api_headers()
}

fn extract_requested_file(
    request: &Value,
    config: &HandlerConfig,
    store: &dyn ObjectStore,
    detector: &dyn TextDetector,
) -> Result<ExtractionResult, ExtractionError> {
    let key = file_key(request).ok_or(ExtractionError::MissingFileKey)?;
    let object = ObjectReference::new(&config.upload_bucket, key);

    tracing::info!(
        component = "request_handler",
        event = "request_received",
        bucket = %object.bucket,
        key = %object.key,
    );

    store
        .probe(&object)
        .map_err(|error| ExtractionError::from_probe(&object, error))?;

    extract_text(detector, &object)
}

/// `queryStringParameters.fileKey`; null, non-string, and empty values count as absent.
pub fn file_key(request: &Value) -> Option<&str> {
    request
        .get("queryStringParameters")
        .and_then(|parameters| parameters.get(FILE_KEY_PARAMETER))
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
}

fn log_request_failure(error: &ExtractionError) {
    match error {
        ExtractionError::MissingFileKey | ExtractionError::NotFound(_) => tracing::warn!(
            component = "request_handler",
            event = "request_rejected",
            status = error.status_code(),
            error = %error,
        ),
        ExtractionError::Access { .. } | ExtractionError::Processing { .. } => tracing::error!(
            component = "request_handler",
            event = "request_failed",
            status = error.status_code(),
            error = %error,
        ),
    }
}
