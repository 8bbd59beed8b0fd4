//! Document pipeline: upload storage and two-step extract-then-summarize orchestration.

mod service;
pub mod types;

pub use service::{DocumentApi, DocumentService};
pub use types::{FileUpload, ProcessingError};
