use ocr_pipeline_core::event::{S3EventNotification, S3EventRecord};
use ocr_pipeline_core::outcome::{Outcome, STATUS_BAD_REQUEST, STATUS_OK};
use serde_json::{json, Value};

use crate::adapters::text_detection::TextDetector;
use crate::config::EventBatchPolicy;
use crate::handlers::extract_text;

pub const INVALID_EVENT_MESSAGE: &str = "Invalid storage event";
pub const EMPTY_EVENT_MESSAGE: &str = "No records in storage event";

/// Object-created notification from the uploads bucket.
///
/// Bucket and key are taken verbatim from each record, with no existence
/// probe. Under [`EventBatchPolicy::FirstRecord`] only the first record is
/// processed and the remaining records in the batch are skipped. Every
/// outcome carries the same JSON and CORS headers as the request path.
pub fn handle_storage_event(
    event: Value,
    policy: EventBatchPolicy,
    detector: &dyn TextDetector,
) -> Outcome {
    let outcome = storage_event_outcome(event, policy, detector);
    tracing::info!(
        component = "event_handler",
        event = "event_completed",
        status = outcome.status,
    );
    outcome.with_api_headers()
}

fn storage_event_outcome(
    event: Value,
    policy: EventBatchPolicy,
    detector: &dyn TextDetector,
) -> Outcome {
    let notification = match S3EventNotification::from_value(event) {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(
                component = "event_handler",
                event = "event_rejected",
                error = %error,
            );
            return Outcome::error(STATUS_BAD_REQUEST, INVALID_EVENT_MESSAGE);
        }
    };

    let Some(first) = notification.records.first() else {
        tracing::warn!(component = "event_handler", event = "event_empty");
        return Outcome::error(STATUS_BAD_REQUEST, EMPTY_EVENT_MESSAGE);
    };

    match policy {
        EventBatchPolicy::FirstRecord => {
            let skipped = notification.records.len() - 1;
            if skipped > 0 {
                tracing::info!(
                    component = "event_handler",
                    event = "records_skipped",
                    skipped,
                );
            }
            process_record(first, detector)
        }
        EventBatchPolicy::AllRecords => process_all_records(&notification.records, detector),
    }
}

fn process_record(record: &S3EventRecord, detector: &dyn TextDetector) -> Outcome {
    let object = record.object_reference();
    tracing::info!(
        component = "event_handler",
        event = "record_received",
        bucket = %object.bucket,
        key = %object.key,
    );

    match extract_text(detector, &object) {
        Ok(result) => Outcome::extracted(&result),
        Err(error) => {
            tracing::error!(
                component = "event_handler",
                event = "record_failed",
                error = %error,
            );
            error.to_outcome()
        }
    }
}

fn process_all_records(records: &[S3EventRecord], detector: &dyn TextDetector) -> Outcome {
    let mut status = STATUS_OK;
    let mut results = Vec::with_capacity(records.len());

    for record in records {
        let object = record.object_reference();
        let outcome = process_record(record, detector);
        if status == STATUS_OK && !outcome.is_success() {
            status = outcome.status;
        }

        let mut entry = json!({"bucket": object.bucket, "key": object.key});
        if let (Some(entry_fields), Value::Object(body)) = (entry.as_object_mut(), outcome.body) {
            entry_fields.extend(body);
        }
        results.push(entry);
    }

    Outcome::new(status, json!({ "results": results }))
}
