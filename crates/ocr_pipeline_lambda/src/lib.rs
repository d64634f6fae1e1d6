//! AWS-oriented adapters and handlers for the document OCR pipeline.
//!
//! This crate owns runtime integration details (the Lambda handlers, the
//! object store and text detection ports, and process configuration). The
//! contract types, line reduction, and stack manifest live in
//! `ocr_pipeline_core`.

pub mod adapters;
pub mod config;
pub mod error;
pub mod handlers;
