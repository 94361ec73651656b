use thiserror::Error;

use crate::cache::CacheError;
use crate::codec::CodecError;
use crate::fetch::FetchError;
use crate::handlers::ResourceKind;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Bad field request: '{0}'")]
    BadFieldRequest(String),

    #[error("No handler registered for resource type '{0}'")]
    UnhandledResourceType(ResourceKind),

    #[error("Fetch failed: {0}")]
    FetchFailed(#[from] FetchError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Body codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to compute field '{field}': {message}")]
    Compute { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, ResourceError>;
