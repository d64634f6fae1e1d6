//! Static description of the provisioned stack.
//!
//! The manifest is data only: it is loaded, validated, and rendered into the
//! frontend `config.json`, but nothing in the handler path reads it. The one
//! invariant it guards for the handler is that the function's `UPLOAD_BUCKET`
//! environment value names the uploads bucket the function may read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage_keys::uploads_bucket_url;

pub const UPLOAD_BUCKET_ENV: &str = "UPLOAD_BUCKET";
pub const MAX_FUNCTION_TIMEOUT_SECS: u64 = 900;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("bucket name '{name}' is invalid: {reason}")]
    InvalidBucketName { name: String, reason: &'static str },
    #[error("uploads and frontend buckets must be distinct (both '{0}')")]
    DuplicateBucket(String),
    #[error("function environment must set UPLOAD_BUCKET")]
    MissingUploadBucketEnv,
    #[error("function UPLOAD_BUCKET='{configured}' does not match uploads bucket '{expected}'")]
    UploadBucketMismatch { configured: String, expected: String },
    #[error("function must be granted read access to the uploads bucket")]
    MissingReadGrant,
    #[error("function timeout must be between 1 and 900 seconds, got {0}")]
    InvalidTimeout(u64),
    #[error("manifest is not valid JSON: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorsRule {
    pub allowed_methods: Vec<String>,
    pub allowed_origins: Vec<String>,
    pub allowed_headers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadsBucket {
    pub name: String,
    pub versioned: bool,
    pub destroy_on_delete: bool,
    pub cors: Vec<CorsRule>,
    /// Anonymous `s3:PutObject` on every key. Open by default in the deployed stack.
    pub public_write: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrontendBucket {
    pub name: String,
    pub index_document: String,
    pub destroy_on_delete: bool,
    /// Anonymous website reads.
    pub public_read: bool,
    /// Assets deployed from the frontend directory; `config.json` is generated.
    pub excluded_assets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: String,
    pub handler: String,
    pub timeout_secs: u64,
    pub environment: BTreeMap<String, String>,
    pub read_grants: Vec<String>,
    pub ocr_actions: Vec<String>,
    /// Invoke on object-created notifications from the uploads bucket.
    pub trigger_on_upload: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiSpec {
    pub name: String,
    pub proxy: bool,
    pub cors_allow_origins: Vec<String>,
    pub cors_allow_methods: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackManifest {
    pub uploads: UploadsBucket,
    pub frontend: FrontendBucket,
    pub function: FunctionSpec,
    pub api: ApiSpec,
}

/// The document served to the static site as `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrontendConfig {
    #[serde(rename = "UPLOAD_BUCKET")]
    pub upload_bucket: String,
    #[serde(rename = "API_URL")]
    pub api_url: String,
}

impl Default for StackManifest {
    fn default() -> Self {
        let uploads_name = "textract-uploads-bucket".to_string();
        Self {
            uploads: UploadsBucket {
                name: uploads_name.clone(),
                versioned: true,
                destroy_on_delete: true,
                cors: vec![CorsRule {
                    allowed_methods: vec!["PUT".to_string()],
                    allowed_origins: vec!["*".to_string()],
                    allowed_headers: vec!["*".to_string()],
                }],
                public_write: true,
            },
            frontend: FrontendBucket {
                name: "textract-frontend-bucket".to_string(),
                index_document: "index.html".to_string(),
                destroy_on_delete: true,
                public_read: true,
                excluded_assets: vec!["config.json".to_string()],
            },
            function: FunctionSpec {
                name: "TextractProcessingLambda".to_string(),
                handler: "bootstrap".to_string(),
                timeout_secs: 15,
                environment: BTreeMap::from([(
                    UPLOAD_BUCKET_ENV.to_string(),
                    uploads_name.clone(),
                )]),
                read_grants: vec![uploads_name],
                ocr_actions: vec!["textract:*".to_string()],
                trigger_on_upload: true,
            },
            api: ApiSpec {
                name: "TextractAPI".to_string(),
                proxy: true,
                cors_allow_origins: vec!["*".to_string()],
                cors_allow_methods: vec!["*".to_string()],
            },
        }
    }
}

impl StackManifest {
    pub fn from_json(text: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(text).map_err(|error| ManifestError::Malformed(error.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, ManifestError> {
        serde_json::to_string_pretty(self)
            .map_err(|error| ManifestError::Malformed(error.to_string()))
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        validate_bucket_name(&self.uploads.name)?;
        validate_bucket_name(&self.frontend.name)?;
        if self.uploads.name == self.frontend.name {
            return Err(ManifestError::DuplicateBucket(self.uploads.name.clone()));
        }

        let configured = self
            .function
            .environment
            .get(UPLOAD_BUCKET_ENV)
            .ok_or(ManifestError::MissingUploadBucketEnv)?;
        if configured != &self.uploads.name {
            return Err(ManifestError::UploadBucketMismatch {
                configured: configured.clone(),
                expected: self.uploads.name.clone(),
            });
        }

        if !self.function.read_grants.contains(&self.uploads.name) {
            return Err(ManifestError::MissingReadGrant);
        }

        let timeout_secs = self.function.timeout_secs;
        if timeout_secs == 0 || timeout_secs > MAX_FUNCTION_TIMEOUT_SECS {
            return Err(ManifestError::InvalidTimeout(timeout_secs));
        }

        Ok(())
    }

    pub fn frontend_config(&self, api_url: &str) -> FrontendConfig {
        FrontendConfig {
            upload_bucket: uploads_bucket_url(&self.uploads.name),
            api_url: api_url.to_string(),
        }
    }
}

fn validate_bucket_name(name: &str) -> Result<(), ManifestError> {
    let invalid = |reason: &'static str| ManifestError::InvalidBucketName {
        name: name.to_string(),
        reason,
    };

    if name.len() < 3 || name.len() > 63 {
        return Err(invalid("must be 3-63 characters long"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(invalid("only lowercase letters, digits, '-' and '.' are allowed"));
    }
    let starts_ok = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let ends_ok = name.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
    if !starts_ok || !ends_ok {
        return Err(invalid("must start and end with a letter or digit"));
    }
    if name.contains("..") {
        return Err(invalid("must not contain consecutive dots"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_manifest_is_valid_and_open_by_default() {
        let manifest = StackManifest::default();

        assert_eq!(manifest.validate(), Ok(()));
        assert!(manifest.uploads.public_write);
        assert!(manifest.frontend.public_read);
        assert_eq!(manifest.function.timeout_secs, 15);
    }

    #[test]
    fn rejects_upload_bucket_env_that_drifts_from_bucket_name() {
        let mut manifest = StackManifest::default();
        manifest
            .function
            .environment
            .insert(UPLOAD_BUCKET_ENV.to_string(), "some-other-bucket".to_string());

        assert_eq!(
            manifest.validate(),
            Err(ManifestError::UploadBucketMismatch {
                configured: "some-other-bucket".to_string(),
                expected: "textract-uploads-bucket".to_string(),
            })
        );
    }

    #[test]
    fn rejects_missing_env_and_read_grant() {
        let mut manifest = StackManifest::default();
        manifest.function.environment.clear();
        assert_eq!(manifest.validate(), Err(ManifestError::MissingUploadBucketEnv));

        let mut manifest = StackManifest::default();
        manifest.function.read_grants.clear();
        assert_eq!(manifest.validate(), Err(ManifestError::MissingReadGrant));
    }

    #[test]
    fn rejects_out_of_range_timeout() {
        let mut manifest = StackManifest::default();
        manifest.function.timeout_secs = 901;

        assert_eq!(manifest.validate(), Err(ManifestError::InvalidTimeout(901)));
    }

    #[test]
    fn rejects_invalid_bucket_names() {
        for name in ["ab", "Upper-Case", "-leading", "double..dot", "under_score"] {
            let mut manifest = StackManifest::default();
            manifest.frontend.name = name.to_string();
            assert!(
                matches!(manifest.validate(), Err(ManifestError::InvalidBucketName { .. })),
                "expected '{name}' to be rejected"
            );
        }
    }

    #[test]
    fn rejects_shared_bucket() {
        let mut manifest = StackManifest::default();
        manifest.frontend.name = manifest.uploads.name.clone();

        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::DuplicateBucket(_))
        ));
    }

    #[test]
    fn frontend_config_uses_upper_case_keys() {
        let config = StackManifest::default()
            .frontend_config("https://abc123.execute-api.us-east-1.amazonaws.com/prod/");

        let value = serde_json::to_value(&config).expect("config should serialize");
        assert_eq!(
            value["UPLOAD_BUCKET"],
            "https://textract-uploads-bucket.s3.amazonaws.com/"
        );
        assert_eq!(
            value["API_URL"],
            "https://abc123.execute-api.us-east-1.amazonaws.com/prod/"
        );
    }

    #[test]
    fn reports_malformed_json() {
        let error = StackManifest::from_json("{\"uploads\": 3}").expect_err("should fail");
        assert!(matches!(error, ManifestError::Malformed(_)));
    }

    #[test]
    fn checked_in_stack_file_matches_defaults() {
        let manifest = StackManifest::from_json(include_str!("../../../infra/stack.json"))
            .expect("infra/stack.json should parse");

        assert_eq!(manifest, StackManifest::default());
    }
}
