//! S3-backed object store.

use crate::config::Config;
use crate::storage::types::{ObjectStore, StorageError, object_key, public_url};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

/// Stores uploads in a single S3 bucket with one `PutObject` per file.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl S3ObjectStore {
    /// Build a client for the configured bucket using the default AWS credential chain.
    ///
    /// When `s3_endpoint_url` is set the client talks to that S3-compatible endpoint with
    /// path-style addressing.
    pub async fn new(config: &Config) -> Self {
        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(config.s3_region.clone()));
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        let client = match config.s3_endpoint_url.as_deref() {
            Some(endpoint) => {
                let s3_config = aws_sdk_s3::config::Builder::from(&shared)
                    .endpoint_url(endpoint)
                    .force_path_style(true)
                    .build();
                Client::from_conf(s3_config)
            }
            None => Client::new(&shared),
        };

        tracing::debug!(
            bucket = %config.s3_bucket,
            region = %config.s3_region,
            endpoint = ?config.s3_endpoint_url,
            "Initialized S3 client"
        );

        Self::from_client(
            client,
            config.s3_bucket.clone(),
            config.s3_region.clone(),
            config.s3_endpoint_url.clone(),
        )
    }

    /// Wrap an already configured SDK client.
    pub fn from_client(
        client: Client,
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> Self {
        Self {
            client,
            bucket,
            region,
            endpoint_url,
        }
    }

    fn object_url(&self, key: &str) -> String {
        match self.endpoint_url.as_deref() {
            Some(endpoint) => format!(
                "{}/{}/{}",
                endpoint.trim_end_matches('/'),
                self.bucket,
                key
            ),
            None => public_url(&self.bucket, &self.region, key),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn store(
        &self,
        content: Bytes,
        content_type: &str,
        original_name: &str,
    ) -> Result<String, StorageError> {
        let key = object_key(original_name)?;
        let size = content.len();
        let start = std::time::Instant::now();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(content))
            .send()
            .await
            .map_err(|error| {
                let error = DisplayErrorContext(error);
                tracing::error!(
                    error = %error,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    "S3 upload failed"
                );
                StorageError::Upload(error.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.object_url(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::retry::RetryConfig;
    use aws_sdk_s3::config::{Credentials, Region};
    use httpmock::{Method::PUT, MockServer};
    use regex::Regex;

    fn mock_store(server: &MockServer) -> S3ObjectStore {
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "static"))
            .endpoint_url(server.base_url())
            .force_path_style(true)
            .retry_config(RetryConfig::disabled())
            .build();
        S3ObjectStore::from_client(
            Client::from_conf(s3_config),
            "uploads".into(),
            "us-east-1".into(),
            Some(server.base_url()),
        )
    }

    #[test]
    fn aws_urls_use_virtual_hosted_style() {
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(Region::new("ap-south-1"))
            .build();
        let store = S3ObjectStore::from_client(
            Client::from_conf(s3_config),
            "nebula-files".into(),
            "ap-south-1".into(),
            None,
        );

        assert_eq!(
            store.object_url("k.png"),
            "https://nebula-files.s3.ap-south-1.amazonaws.com/k.png"
        );
    }

    #[tokio::test]
    async fn store_puts_object_under_generated_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path_matches(Regex::new(r"^/uploads/[0-9a-f-]{36}\.pdf$").unwrap())
                    .header("content-type", "application/pdf");
                then.status(200);
            })
            .await;

        let store = mock_store(&server);
        let url = store
            .store(Bytes::from_static(b"%PDF-1.4"), "application/pdf", "paper.pdf")
            .await
            .expect("upload");

        mock.assert_async().await;
        let expected = Regex::new(&format!(
            r"^{}/uploads/[0-9a-f-]{{36}}\.pdf$",
            regex::escape(&server.base_url())
        ))
        .unwrap();
        assert!(expected.is_match(&url), "unexpected url {url}");
    }

    #[tokio::test]
    async fn missing_extension_fails_before_any_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT);
                then.status(200);
            })
            .await;

        let store = mock_store(&server);
        let error = store
            .store(Bytes::from_static(b"data"), "text/plain", "notes")
            .await
            .expect_err("no extension");

        assert!(matches!(error, StorageError::MissingExtension(_)));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn rejected_put_surfaces_upload_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT);
                then.status(403)
                    .header("content-type", "application/xml")
                    .body("<Error><Code>AccessDenied</Code><Message>denied</Message></Error>");
            })
            .await;

        let store = mock_store(&server);
        let error = store
            .store(Bytes::from_static(b"data"), "text/plain", "notes.txt")
            .await
            .expect_err("rejected");

        assert!(matches!(error, StorageError::Upload(_)));
    }
}
