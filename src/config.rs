use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Default endpoint of the document-to-text conversion service.
pub const DEFAULT_PDF_API_URL: &str = "https://api.pdf.co/v1/pdf/convert/to/text-simple";
/// Default base URL of the generative-language API.
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default generative model used for summaries.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
/// Log file used when `PDFBRIEF_LOG_FILE` is unset.
pub const DEFAULT_LOG_FILE: &str = "logs/pdfbrief.log";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the pdfbrief server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// API key sent to the conversion service in the `x-api-key` header.
    pub pdf_api_key: String,
    /// Endpoint that converts a remote document into plain text.
    pub pdf_api_url: String,
    /// API key for the generative-language service; checked when a summary is requested.
    pub gemini_api_key: Option<String>,
    /// Base URL of the generative-language service.
    pub gemini_api_url: String,
    /// Model identifier used for summaries.
    pub gemini_model: String,
    /// Bucket receiving uploaded files.
    pub s3_bucket: String,
    /// Region hosting the bucket.
    pub s3_region: String,
    /// Optional endpoint for S3-compatible providers (MinIO, Spaces, ...).
    pub s3_endpoint_url: Option<String>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// File receiving a copy of the log output.
    pub log_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            pdf_api_key: load_env("PDF_API_KEY")?,
            pdf_api_url: load_env_optional("PDF_API_URL")
                .unwrap_or_else(|| DEFAULT_PDF_API_URL.to_string()),
            gemini_api_key: load_env_optional("GEMINI_API_KEY"),
            gemini_api_url: load_env_optional("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            gemini_model: load_env_optional("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            s3_bucket: load_env("AWS_S3_BUCKET")?,
            s3_region: load_env("AWS_S3_REGION")?,
            s3_endpoint_url: load_env_optional("AWS_S3_ENDPOINT_URL"),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| parse_port(&value))
                .transpose()?,
            log_file: log_file_path(load_env_optional("PDFBRIEF_LOG_FILE")),
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_port(value: &str) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
}

fn log_file_path(value: Option<String>) -> PathBuf {
    value
        .map(|path| PathBuf::from(path.trim()))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment and install it in the global cache.
///
/// A second call returns the configuration installed by the first.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}
