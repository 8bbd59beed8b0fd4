//! HTTP surface for pdfbrief.
//!
//! - `GET /health` – Static liveness payload.
//! - `POST /api/upload/file` – Multipart upload (field `file`) stored in S3; returns the public URL.
//! - `POST /public/pdf` – Envelope whose `body` is a document URL; returns a summary envelope.
//!
//! Each handler is the final error boundary for its endpoint: failures are always rendered as
//! JSON, never as a bare status or a dropped connection.

use crate::envelope::{SummaryEnvelope, SummaryRequest};
use crate::processing::{DocumentApi, FileUpload, ProcessingError};
use crate::storage::StorageError;
use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::MultipartError, rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use futures_util::FutureExt;
use serde::Serialize;
use serde_json::json;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Largest request body accepted by the upload endpoint.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Build the HTTP router exposing the upload, summarize, and health endpoints.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: DocumentApi + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/upload/file",
            post(upload_file::<S>).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/public/pdf", post(summarize_document::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Service is running",
    })
}

/// Success response for `POST /api/upload/file`.
#[derive(Serialize)]
struct UploadResponse {
    message: &'static str,
    url: String,
}

/// Store the multipart `file` field and return its public URL.
async fn upload_file<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, UploadError>
where
    S: DocumentApi,
{
    let upload = read_file_field(&mut multipart).await?;
    let url = service.upload_file(upload).await?;
    Ok(Json(UploadResponse {
        message: "File uploaded successfully",
        url,
    }))
}

async fn read_file_field(multipart: &mut Multipart) -> Result<FileUpload, UploadError> {
    while let Some(field) = multipart.next_field().await.map_err(read_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let content = field.bytes().await.map_err(read_error)?;
        return Ok(FileUpload::new(content, content_type, original_name));
    }
    Err(UploadError::MissingFile)
}

fn read_error(error: MultipartError) -> UploadError {
    UploadError::Processing(StorageError::Read(error.body_text()).into())
}

enum UploadError {
    MissingFile,
    Processing(ProcessingError),
}

impl From<ProcessingError> for UploadError {
    fn from(inner: ProcessingError) -> Self {
        Self::Processing(inner)
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::MissingFile => (
                StatusCode::BAD_REQUEST,
                "Required multipart field 'file' is missing".to_string(),
            ),
            Self::Processing(error) => {
                tracing::error!(error = %error, "Upload failed");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        };
        (
            status,
            Json(json!({ "message": format!("Error uploading file: {detail}") })),
        )
            .into_response()
    }
}

/// Summarize the document whose URL arrives in the envelope `body`.
///
/// Any envelope produced by the pipeline is returned with 200, including failure envelopes.
/// Requests without a usable document URL get 400 and a panic in the pipeline gets 500.
async fn summarize_document<S>(
    State(service): State<Arc<S>>,
    request: Result<Json<SummaryRequest>, JsonRejection>,
) -> (StatusCode, Json<SummaryEnvelope>)
where
    S: DocumentApi,
{
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let status = rejection.status();
            return (
                status,
                Json(SummaryEnvelope::failure_with_status(
                    status.as_u16().into(),
                    rejection.body_text(),
                )),
            );
        }
    };
    let Some(document_url) = request.document_url() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(SummaryEnvelope::failure_with_status(
                StatusCode::BAD_REQUEST.as_u16().into(),
                "document URL is required in 'body'",
            )),
        );
    };

    match AssertUnwindSafe(service.summarize_document(&document_url))
        .catch_unwind()
        .await
    {
        Ok(envelope) => (StatusCode::OK, Json(envelope)),
        Err(panic) => {
            let detail = panic_message(panic.as_ref());
            tracing::error!(document_url = %document_url, detail, "Summarization panicked");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SummaryEnvelope::failure(format!("unexpected failure: {detail}"))),
            )
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
