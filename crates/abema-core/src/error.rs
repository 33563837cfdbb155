//! Error types for the ABEMA metadata extractor
//!
//! Only page fetches and output rendering can fail. Pattern misses while
//! parsing are never errors; they simply produce less data.

use thiserror::Error;

/// Error type for all extractor operations
#[derive(Error, Debug)]
pub enum AbemaError {
    /// The URL is malformed, outside the service origin, or the page does not exist
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The page could not be retrieved, either after all retries or because of
    /// an error that retrying cannot fix
    #[error("Network failure for {url} after {attempts} attempt(s): {reason}")]
    NetworkFailure {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The series document could not be rendered
    #[error("Failed to serialize document: {0}")]
    Serialization(#[from] serde_yaml::Error),
}

impl AbemaError {
    /// True when the error means the resource is unusable rather than unreachable
    pub fn is_invalid_url(&self) -> bool {
        matches!(self, AbemaError::InvalidUrl(_))
    }
}

/// Result type alias for extractor operations
pub type Result<T> = std::result::Result<T, AbemaError>;
