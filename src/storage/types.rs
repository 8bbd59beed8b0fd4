//! Storage contract, errors, and key/URL helpers shared by backends.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

/// Errors returned while persisting an uploaded file.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The original file name carries no extension to build the object key from.
    #[error("File name '{0}' has no extension")]
    MissingExtension(String),
    /// The upload stream could not be read.
    #[error("Failed to read upload: {0}")]
    Read(String),
    /// The remote write was rejected or never completed.
    #[error("Failed to store object: {0}")]
    Upload(String),
}

/// Blob store that accepts file content and hands back a public URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `content` under a freshly generated key and return its public URL.
    async fn store(
        &self,
        content: Bytes,
        content_type: &str,
        original_name: &str,
    ) -> Result<String, StorageError>;
}

/// Extension of `original_name` including the leading dot (`"report.pdf"` -> `".pdf"`).
pub fn file_extension(original_name: &str) -> Result<&str, StorageError> {
    original_name
        .rfind('.')
        .map(|idx| &original_name[idx..])
        .ok_or_else(|| StorageError::MissingExtension(original_name.to_string()))
}

/// Generate a unique object key: a random UUID followed by the original extension.
///
/// The key never contains the original file name, so two uploads of `a.pdf` do not collide.
pub fn object_key(original_name: &str) -> Result<String, StorageError> {
    let extension = file_extension(original_name)?;
    Ok(format!("{}{extension}", Uuid::new_v4()))
}

/// Public URL of an object stored in AWS S3.
pub fn public_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
}
