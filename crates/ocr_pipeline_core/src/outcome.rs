use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::contract::ExtractionResult;

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

pub const MISSING_FILE_KEY_MESSAGE: &str = "fileKey parameter is required";
pub const FILE_NOT_FOUND_MESSAGE: &str = "File not found";
pub const FILE_ACCESS_ERROR_MESSAGE: &str = "Error accessing file";
pub const PROCESSING_ERROR_MESSAGE: &str = "Failed to process file";

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const ALLOW_ORIGIN_HEADER: &str = "Access-Control-Allow-Origin";

/// Result of one handler invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: u16,
    pub body: Value,
    pub headers: BTreeMap<String, String>,
}

impl Outcome {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            headers: BTreeMap::new(),
        }
    }

    pub fn extracted(result: &ExtractionResult) -> Self {
        Self::new(STATUS_OK, json!({ "extracted_text": result.extracted_text }))
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self::new(status, json!({ "error": message }))
    }

    /// Adds the JSON content type and the permissive CORS origin header.
    pub fn with_api_headers(mut self) -> Self {
        self.headers
            .insert(CONTENT_TYPE_HEADER.to_string(), "application/json".to_string());
        self.headers
            .insert(ALLOW_ORIGIN_HEADER.to_string(), "*".to_string());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.body.get("extracted_text").and_then(Value::as_str)
    }

    pub fn into_proxy_response(self) -> ApiGatewayResponse {
        ApiGatewayResponse {
            status_code: self.status,
            headers: self.headers,
            body: self.body.to_string(),
        }
    }
}

/// Proxy-integration response shape relayed by API Gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub body: String,
}
