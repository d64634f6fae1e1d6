use std::str::FromStr;

use ocr_pipeline_core::manifest::UPLOAD_BUCKET_ENV;
use thiserror::Error;

pub const EVENT_BATCH_POLICY_ENV: &str = "OCR_EVENT_BATCH_POLICY";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("UPLOAD_BUCKET must be configured")]
    MissingUploadBucket,
    #[error("unsupported OCR_EVENT_BATCH_POLICY '{0}' (expected first or all)")]
    InvalidBatchPolicy(String),
}

/// How many records of one storage notification batch are processed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventBatchPolicy {
    /// Process the first record and return its outcome; the rest are skipped.
    #[default]
    FirstRecord,
    AllRecords,
}

impl FromStr for EventBatchPolicy {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "first" | "first_record" | "first-record" => Ok(Self::FirstRecord),
            "all" | "all_records" | "all-records" => Ok(Self::AllRecords),
            _ => Err(ConfigError::InvalidBatchPolicy(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerConfig {
    /// Bucket that request-triggered invocations resolve `fileKey` against.
    pub upload_bucket: String,
    pub event_batch_policy: EventBatchPolicy,
}

impl HandlerConfig {
    pub fn new(upload_bucket: impl Into<String>) -> Self {
        Self {
            upload_bucket: upload_bucket.into(),
            event_batch_policy: EventBatchPolicy::default(),
        }
    }

    pub fn with_event_batch_policy(mut self, policy: EventBatchPolicy) -> Self {
        self.event_batch_policy = policy;
        self
    }

    /// Reads the process environment once; call at start-up.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let upload_bucket = lookup(UPLOAD_BUCKET_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or(ConfigError::MissingUploadBucket)?;

        let event_batch_policy = match lookup(EVENT_BATCH_POLICY_ENV) {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => EventBatchPolicy::default(),
        };

        Ok(Self {
            upload_bucket,
            event_batch_policy,
        })
    }
}
