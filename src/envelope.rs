//! Uniform request/response shape of the summarization endpoint.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Inbound body of the summarization endpoint.
///
/// Clients send the envelope shape, but only `body` (the document URL) is read. Every other
/// field is ignored whatever its type or value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SummaryRequest {
    /// URL of the document to summarize.
    pub body: Option<String>,
}

impl SummaryRequest {
    /// Document URL, if one was supplied and is not blank.
    pub fn document_url(self) -> Option<String> {
        self.body.filter(|url| !url.trim().is_empty())
    }
}

/// Text payload plus error flag and status code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryEnvelope {
    /// Summary text on success, `"Error: ..."` on failure.
    pub body: Option<String>,
    /// Whether the envelope reports a failure.
    pub error: bool,
    /// HTTP-style status code describing the outcome.
    pub status: i32,
    /// Unused by the service; echoed as `null`.
    pub name: Option<String>,
}

impl SummaryEnvelope {
    /// Successful envelope carrying `summary`.
    pub fn success(summary: impl Into<String>) -> Self {
        Self {
            body: Some(summary.into()),
            error: false,
            status: 200,
            name: None,
        }
    }

    /// Failure envelope with status 500 whose body is `"Error: " + message`.
    pub fn failure(message: impl Display) -> Self {
        Self::failure_with_status(500, message)
    }

    /// Failure envelope with an explicit status.
    pub fn failure_with_status(status: i32, message: impl Display) -> Self {
        Self {
            body: Some(format!("Error: {message}")),
            error: true,
            status,
            name: None,
        }
    }

    /// Collapse a pipeline result into an envelope.
    pub fn from_result<E: Display>(result: Result<String, E>) -> Self {
        match result {
            Ok(summary) => Self::success(summary),
            Err(error) => Self::failure(error),
        }
    }
}
