//! S3 object notification decoding.

use serde::Deserialize;
use serde_json::Value;

use crate::contract::ObjectReference;

pub const S3_EVENT_SOURCE: &str = "aws:s3";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct S3EventNotification {
    #[serde(rename = "Records")]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct S3EventRecord {
    #[serde(rename = "eventSource", default)]
    pub event_source: Option<String>,
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct S3Object {
    pub key: String,
}

impl S3EventRecord {
    /// Bucket and key exactly as they appear in the notification.
    pub fn object_reference(&self) -> ObjectReference {
        ObjectReference::new(&self.s3.bucket.name, &self.s3.object.key)
    }
}

impl S3EventNotification {
    pub fn from_value(event: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(event)
    }
}

/// True when the payload is a non-empty `Records` batch sourced from S3.
pub fn is_s3_event(event: &Value) -> bool {
    event
        .get("Records")
        .and_then(Value::as_array)
        .map(|records| {
            !records.is_empty()
                && records.iter().all(|record| {
                    record
                        .get("eventSource")
                        .and_then(Value::as_str)
                        .map(|source| source == S3_EVENT_SOURCE)
                        .unwrap_or(false)
                })
        })
        .unwrap_or(false)
}
