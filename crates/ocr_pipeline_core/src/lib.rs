//! Shared document OCR pipeline domain primitives.
//!
//! This crate owns the handler contract (object references, text blocks,
//! outcomes), the line reduction, S3 event decoding, and the static stack
//! manifest. It intentionally excludes AWS SDK and Lambda runtime concerns.

pub mod contract;
pub mod event;
pub mod extraction;
pub mod manifest;
pub mod outcome;
pub mod storage_keys;
