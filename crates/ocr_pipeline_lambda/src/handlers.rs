pub mod event;
pub mod request;

use ocr_pipeline_core::contract::{ExtractionResult, ObjectReference};
use ocr_pipeline_core::event::is_s3_event;
use ocr_pipeline_core::extraction::{line_count, reduce_lines};
use ocr_pipeline_core::outcome::Outcome;
use serde_json::Value;

use crate::adapters::object_store::ObjectStore;
use crate::adapters::text_detection::TextDetector;
use crate::config::HandlerConfig;
use crate::error::ExtractionError;

/// Routes one runtime payload: S3 notifications go to the event handler,
/// everything else is treated as an API Gateway proxy request.
pub fn handle_invocation(
    payload: Value,
    config: &HandlerConfig,
    store: &dyn ObjectStore,
    detector: &dyn TextDetector,
) -> Outcome {
    if is_s3_event(&payload) {
        event::handle_storage_event(payload, config.event_batch_policy, detector)
    } else {
        request::handle_extraction_request(&payload, config, store, detector)
    }
}

/// One detection call followed by the LINE reduction.
pub(crate) fn extract_text(
    detector: &dyn TextDetector,
    object: &ObjectReference,
) -> Result<ExtractionResult, ExtractionError> {
    let blocks = detector
        .detect_text(object)
        .map_err(|error| ExtractionError::from_detection(object, error))?;
    let result = reduce_lines(&blocks);

    tracing::info!(
        component = "ocr",
        event = "text_extracted",
        bucket = %object.bucket,
        key = %object.key,
        blocks = blocks.len(),
        lines = line_count(&blocks),
        extracted_text = %result.extracted_text,
    );

    Ok(result)
}
