//! Client for the remote document-to-text conversion service.
//!
//! The service fetches the document itself; we only hand it the URL. The 2xx response body is
//! returned verbatim and treated as the document text.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced while converting a document to text.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The conversion service could not be reached or the body could not be read.
    #[error("Conversion service unavailable: {0}")]
    Unavailable(#[from] reqwest::Error),
    /// The conversion service answered with a non-success status.
    #[error("Conversion service returned {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Raw body attached to the failing response.
        body: String,
    },
}

/// Turns a remote document into plain text.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Fetch and convert the document at `document_url`.
    async fn extract_text(&self, document_url: &str) -> Result<String, ConversionError>;
}

/// Request payload understood by the conversion endpoint.
#[derive(Debug, Serialize)]
struct ConversionRequest<'a> {
    url: &'a str,
    inline: bool,
    #[serde(rename = "async")]
    is_async: bool,
}

impl<'a> ConversionRequest<'a> {
    fn inline(url: &'a str) -> Self {
        Self {
            url,
            inline: true,
            is_async: false,
        }
    }
}

/// PDF.co-compatible conversion client.
pub struct PdfCoClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl PdfCoClient {
    /// Build a client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, ConversionError> {
        let http = Client::builder().user_agent("pdfbrief/convert").build()?;
        Ok(Self::with_client(
            http,
            config.pdf_api_url.clone(),
            config.pdf_api_key.clone(),
        ))
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_client(http: Client, endpoint: String, api_key: String) -> Self {
        Self {
            http,
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl DocumentConverter for PdfCoClient {
    async fn extract_text(&self, document_url: &str) -> Result<String, ConversionError> {
        tracing::debug!(endpoint = %self.endpoint, document_url, "Requesting document text");
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .json(&ConversionRequest::inline(document_url))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%status, document_url, "Conversion service rejected document");
            return Err(ConversionError::UnexpectedStatus { status, body });
        }

        tracing::debug!(chars = body.len(), "Received document text");
        Ok(body)
    }
}
