#![deny(missing_docs)]

//! Core library for the pdfbrief document service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Document-to-text conversion client.
pub mod conversion;
/// Summary request/response envelope.
pub mod envelope;
/// Structured logging and tracing setup.
pub mod logging;
/// Upload storage and summarization orchestration.
pub mod processing;
/// Object storage for uploaded files.
pub mod storage;
/// Generative-language summarization client.
pub mod summarization;
