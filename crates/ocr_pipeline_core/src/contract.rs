use std::fmt;

use serde::{Deserialize, Serialize};

/// Locates one document in the object store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ObjectReference {
    pub bucket: String,
    pub key: String,
}

impl ObjectReference {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    Line,
    Word,
    Page,
    Other(String),
}

impl BlockKind {
    /// Maps the service's block type tag (`LINE`, `WORD`, ...) onto a kind.
    pub fn from_service_tag(tag: &str) -> Self {
        match tag {
            "LINE" => Self::Line,
            "WORD" => Self::Word,
            "PAGE" => Self::Page,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Line => "LINE",
            Self::Word => "WORD",
            Self::Page => "PAGE",
            Self::Other(tag) => tag,
        }
    }
}

impl Serialize for BlockKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_service_tag(&tag))
    }
}

/// One block of a detection response. Geometry is dropped at the adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextBlock {
    #[serde(rename = "BlockType")]
    pub kind: BlockKind,
    #[serde(rename = "Text", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl TextBlock {
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Line,
            text: Some(text.into()),
        }
    }

    pub fn word(text: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Word,
            text: Some(text.into()),
        }
    }

    pub fn page() -> Self {
        Self {
            kind: BlockKind::Page,
            text: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionResult {
    pub extracted_text: String,
}
