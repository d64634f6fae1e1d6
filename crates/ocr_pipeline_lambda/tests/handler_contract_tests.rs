use std::sync::atomic::{AtomicUsize, Ordering};

use ocr_pipeline_core::contract::{ObjectReference, TextBlock};
use ocr_pipeline_core::outcome::Outcome;
use ocr_pipeline_lambda::adapters::object_store::{ObjectStore, ProbeError};
use ocr_pipeline_lambda::adapters::text_detection::{DetectionError, TextDetector};
use ocr_pipeline_lambda::config::{EventBatchPolicy, HandlerConfig};
use ocr_pipeline_lambda::handlers::handle_invocation;
use serde_json::{json, Value};

const UPLOADS: &str = "textract-uploads-bucket";

struct CountingStore {
    result: Result<(), ProbeError>,
    probes: AtomicUsize,
}

impl CountingStore {
    fn new(result: Result<(), ProbeError>) -> Self {
        Self {
            result,
            probes: AtomicUsize::new(0),
        }
    }
}

impl ObjectStore for CountingStore {
    fn probe(&self, _object: &ObjectReference) -> Result<(), ProbeError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

struct CountingDetector {
    result: Result<Vec<TextBlock>, DetectionError>,
    calls: AtomicUsize,
}

impl CountingDetector {
    fn new(result: Result<Vec<TextBlock>, DetectionError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextDetector for CountingDetector {
    fn detect_text(&self, _object: &ObjectReference) -> Result<Vec<TextBlock>, DetectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

fn api_request(file_key: Option<&str>) -> Value {
    let parameters = match file_key {
        Some(key) => json!({ "fileKey": key }),
        None => Value::Null,
    };
    json!({
        "resource": "/",
        "path": "/",
        "httpMethod": "GET",
        "headers": {"Accept": "application/json"},
        "queryStringParameters": parameters,
        "body": null
    })
}

fn s3_notification(keys: &[&str]) -> Value {
    let records: Vec<Value> = keys
        .iter()
        .map(|key| {
            json!({
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "awsRegion": "us-east-1",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "s3SchemaVersion": "1.0",
                    "bucket": {"name": UPLOADS, "arn": "arn:aws:s3:::textract-uploads-bucket"},
                    "object": {"key": key, "size": 2048, "eTag": "abc"}
                }
            })
        })
        .collect();
    json!({ "Records": records })
}

fn invoke(payload: Value, store: &CountingStore, detector: &CountingDetector) -> Outcome {
    handle_invocation(payload, &HandlerConfig::new(UPLOADS), store, detector)
}

fn body_of(outcome: Outcome) -> Value {
    let response = outcome.into_proxy_response();
    serde_json::from_str(&response.body).expect("proxy body should be json")
}

#[test]
fn lines_are_joined_with_trailing_newlines() {
    let texts = ["Quarterly report", "Revenue: 1,204", "", "Signed, A. Person"];
    let store = CountingStore::new(Ok(()));
    let lines = texts.iter().map(|text| TextBlock::line(*text)).collect();
    let detector = CountingDetector::new(Ok(lines));

    let outcome = invoke(api_request(Some("report.pdf")), &store, &detector);

    assert_eq!(outcome.status, 200);
    let expected: String = texts.iter().map(|text| format!("{text}\n")).collect();
    assert_eq!(body_of(outcome)["extracted_text"], Value::from(expected));
}

#[test]
fn zero_lines_yield_empty_text_not_absent() {
    let store = CountingStore::new(Ok(()));
    let detector = CountingDetector::new(Ok(vec![TextBlock::page(), TextBlock::word("stray")]));

    let outcome = invoke(api_request(Some("blank.png")), &store, &detector);

    assert_eq!(outcome.status, 200);
    assert_eq!(body_of(outcome), json!({"extracted_text": ""}));
}

#[test]
fn missing_file_key_makes_no_external_calls() {
    let store = CountingStore::new(Ok(()));
    let detector = CountingDetector::new(Ok(vec![]));

    let outcome = invoke(api_request(None), &store, &detector);

    assert_eq!(outcome.status, 400);
    assert_eq!(store.probes.load(Ordering::SeqCst), 0);
    assert_eq!(detector.calls(), 0);
    assert_eq!(
        body_of(outcome),
        json!({"error": "fileKey parameter is required"})
    );
}

#[test]
fn nonexistent_key_is_not_found_and_skips_detection() {
    let store = CountingStore::new(Err(ProbeError::NotFound));
    let detector = CountingDetector::new(Ok(vec![]));

    let outcome = invoke(api_request(Some("missing.png")), &store, &detector);

    assert_eq!(outcome.status, 404);
    assert_eq!(detector.calls(), 0);
    assert_eq!(body_of(outcome), json!({"error": "File not found"}));
}

#[test]
fn probe_service_error_is_access_error() {
    let store = CountingStore::new(Err(ProbeError::Service("SlowDown".to_string())));
    let detector = CountingDetector::new(Ok(vec![]));

    let outcome = invoke(api_request(Some("a.png")), &store, &detector);

    assert_eq!(outcome.status, 500);
    assert_eq!(body_of(outcome), json!({"error": "Error accessing file"}));
}

#[test]
fn detection_error_is_processing_error() {
    let store = CountingStore::new(Ok(()));
    let detector = CountingDetector::new(Err(DetectionError::new("ProvisionedThroughputExceeded")));

    let outcome = invoke(api_request(Some("a.png")), &store, &detector);

    assert_eq!(outcome.status, 500);
    assert_eq!(detector.calls(), 1);
    assert_eq!(body_of(outcome), json!({"error": "Failed to process file"}));
}

#[test]
fn every_request_response_allows_any_origin() {
    type Scenario = (
        Value,
        Result<(), ProbeError>,
        Result<Vec<TextBlock>, DetectionError>,
    );
    let scenarios: Vec<Scenario> = vec![
        (api_request(Some("ok.png")), Ok(()), Ok(vec![TextBlock::line("x")])),
        (api_request(None), Ok(()), Ok(vec![])),
        (api_request(Some("gone.png")), Err(ProbeError::NotFound), Ok(vec![])),
        (
            api_request(Some("denied.png")),
            Err(ProbeError::Service("AccessDenied".to_string())),
            Ok(vec![]),
        ),
        (api_request(Some("bad.png")), Ok(()), Err(DetectionError::new("boom"))),
    ];

    let mut statuses = Vec::new();
    for (request, probe, detection) in scenarios {
        let store = CountingStore::new(probe);
        let detector = CountingDetector::new(detection);
        let response = invoke(request, &store, &detector).into_proxy_response();

        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.headers["Content-Type"], "application/json");
        statuses.push(response.status_code);
    }

    assert_eq!(statuses, vec![200, 400, 404, 500, 500]);
}

#[test]
fn every_event_response_allows_any_origin() {
    let scenarios: Vec<(Value, Result<Vec<TextBlock>, DetectionError>)> = vec![
        (s3_notification(&["1.png"]), Ok(vec![TextBlock::line("x")])),
        (s3_notification(&["1.png"]), Err(DetectionError::new("boom"))),
        (
            json!({"Records": [{"eventSource": "aws:s3", "s3": {"bucket": {}}}]}),
            Ok(vec![]),
        ),
    ];

    let mut statuses = Vec::new();
    for (event, detection) in scenarios {
        let store = CountingStore::new(Ok(()));
        let detector = CountingDetector::new(detection);
        let response = invoke(event, &store, &detector).into_proxy_response();

        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.headers["Content-Type"], "application/json");
        statuses.push(response.status_code);
    }

    assert_eq!(statuses, vec![200, 500, 400]);
}

#[test]
fn event_batch_processes_only_first_notification_by_default() {
    let store = CountingStore::new(Ok(()));
    let detector = CountingDetector::new(Ok(vec![TextBlock::line("first page")]));

    let outcome = invoke(s3_notification(&["1.png", "2.png", "3.png"]), &store, &detector);

    assert_eq!(outcome.status, 200);
    assert_eq!(detector.calls(), 1);
    assert_eq!(store.probes.load(Ordering::SeqCst), 0);
    assert_eq!(body_of(outcome), json!({"extracted_text": "first page\n"}));
}

#[test]
fn event_batch_can_process_every_notification() {
    let store = CountingStore::new(Ok(()));
    let detector = CountingDetector::new(Ok(vec![TextBlock::line("page")]));
    let config = HandlerConfig::new(UPLOADS).with_event_batch_policy(EventBatchPolicy::AllRecords);

    let outcome = handle_invocation(
        s3_notification(&["1.png", "2.png", "3.png"]),
        &config,
        &store,
        &detector,
    );

    assert_eq!(outcome.status, 200);
    assert_eq!(detector.calls(), 3);
    assert_eq!(
        outcome.body["results"].as_array().map(Vec::len),
        Some(3)
    );
}
