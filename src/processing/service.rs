//! Document service coordinating storage, conversion, and summarization.

use crate::{
    config::Config,
    conversion::{DocumentConverter, PdfCoClient},
    envelope::SummaryEnvelope,
    processing::types::{FileUpload, ProcessingError},
    storage::{ObjectStore, S3ObjectStore},
    summarization::{GeminiClient, SummarizationClient},
};
use async_trait::async_trait;

/// Owns the upstream clients used by the HTTP surface.
///
/// Construct the service once near process start and share it through an `Arc`. The two
/// summarization steps run strictly in sequence; nothing is cached or retried between them.
pub struct DocumentService {
    converter: Box<dyn DocumentConverter>,
    summarizer: Box<dyn SummarizationClient>,
    store: Box<dyn ObjectStore>,
}

/// Abstraction over the document pipeline used by the HTTP router.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Persist an uploaded file and return its public URL.
    async fn upload_file(&self, upload: FileUpload) -> Result<String, ProcessingError>;

    /// Extract and summarize the document at `document_url`.
    ///
    /// Never fails: every error is folded into a failure envelope.
    async fn summarize_document(&self, document_url: &str) -> SummaryEnvelope;
}

impl DocumentService {
    /// Build the production service: PDF.co conversion, Gemini summaries, S3 storage.
    pub async fn new(config: &Config) -> Result<Self, ProcessingError> {
        let converter = PdfCoClient::new(config)?;
        let summarizer = GeminiClient::new(config)?;
        let store = S3ObjectStore::new(config).await;
        tracing::info!(
            model = %config.gemini_model,
            bucket = %config.s3_bucket,
            "Document service initialized"
        );
        Ok(Self::from_parts(
            Box::new(converter),
            Box::new(summarizer),
            Box::new(store),
        ))
    }

    /// Assemble a service from arbitrary component implementations.
    pub fn from_parts(
        converter: Box<dyn DocumentConverter>,
        summarizer: Box<dyn SummarizationClient>,
        store: Box<dyn ObjectStore>,
    ) -> Self {
        Self {
            converter,
            summarizer,
            store,
        }
    }

    /// Store an uploaded file under a generated key.
    pub async fn upload_file(&self, upload: FileUpload) -> Result<String, ProcessingError> {
        let FileUpload {
            content,
            content_type,
            original_name,
        } = upload;
        let url = self
            .store
            .store(content, &content_type, &original_name)
            .await?;
        tracing::info!(url = %url, content_type = %content_type, "File uploaded");
        Ok(url)
    }

    /// Convert the document to text, then summarize that text.
    ///
    /// If summarization fails the extracted text is discarded.
    pub async fn summarize(&self, document_url: &str) -> Result<String, ProcessingError> {
        tracing::info!(document_url, "Summarizing document");
        let text = self.converter.extract_text(document_url).await?;
        let summary = self.summarizer.summarize(&text).await?;
        tracing::info!(
            document_url,
            text_chars = text.len(),
            summary_chars = summary.len(),
            "Summary generated"
        );
        Ok(summary)
    }

    /// Run [`Self::summarize`] and fold the outcome into an envelope.
    pub async fn summarize_document(&self, document_url: &str) -> SummaryEnvelope {
        let result = self.summarize(document_url).await;
        if let Err(error) = &result {
            tracing::warn!(document_url, error = %error, "Summarization failed");
        }
        SummaryEnvelope::from_result(result)
    }
}

#[async_trait]
impl DocumentApi for DocumentService {
    async fn upload_file(&self, upload: FileUpload) -> Result<String, ProcessingError> {
        DocumentService::upload_file(self, upload).await
    }

    async fn summarize_document(&self, document_url: &str) -> SummaryEnvelope {
        DocumentService::summarize_document(self, document_url).await
    }
}
