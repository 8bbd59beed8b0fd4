//! Object storage for uploaded files.

pub mod s3;
pub mod types;

pub use s3::S3ObjectStore;
pub use types::{ObjectStore, StorageError, object_key, public_url};
