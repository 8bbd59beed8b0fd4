//! Inputs and error definitions for the document pipeline.

use crate::{
    conversion::ConversionError, storage::StorageError, summarization::SummarizationClientError,
};
use bytes::Bytes;
use thiserror::Error;

/// Content type assumed when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Errors emitted by the document pipeline.
///
/// Every variant displays its inner message unchanged so callers can prefix it as they see fit.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// Upload could not be read or persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Conversion step failed to produce document text.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// Summarization step failed or returned an unusable payload.
    #[error(transparent)]
    Summarization(#[from] SummarizationClientError),
}

/// A file received from a client, fully buffered.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Raw file bytes.
    pub content: Bytes,
    /// Declared MIME type of the file.
    pub content_type: String,
    /// File name as sent by the client; only its extension is kept.
    pub original_name: String,
}

impl FileUpload {
    /// Build an upload, falling back to [`DEFAULT_CONTENT_TYPE`] when no type was declared.
    pub fn new(content: Bytes, content_type: Option<String>, original_name: String) -> Self {
        Self {
            content,
            content_type: content_type
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            original_name,
        }
    }
}
