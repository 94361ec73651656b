//! Fetch port: retrieves the raw body and mime type of a URL
//!
//! [`HttpFetcher`] is the production implementation; tests substitute their
//! own [`Fetcher`] to avoid the network.

mod http;

pub use http::{HttpConfig, HttpFetcher};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Connection timeout")]
    Timeout,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error("Body of {size} bytes exceeds limit of {limit} bytes")]
    BodyTooLarge { size: u64, limit: u64 },
}

impl FetchError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::RequestFailed(_) | FetchError::Timeout => true,
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::InvalidUrl(_)
            | FetchError::TooManyRedirects
            | FetchError::BodyTooLarge { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;

/// Response body with its mime type essence (`text/html`, `image/jpeg`, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedBody {
    pub body: Bytes,
    pub mime_type: String,
}

/// Performs a GET against a URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedBody>;
}
