use crate::handlers::ResourceKind;
use crate::humanize::ByteSize;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,
}

/// HTTP API settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Requests handled at once before callers queue
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_max_concurrent_requests() -> usize {
    64
}

/// Persistent cache backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Fjall,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackend,
    /// fjall keyspace directory, ignored by the memory backend
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
    /// Lifetime of every cached field, counted from resolution
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            path: default_cache_path(),
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("data/linkcache")
}

fn default_ttl_seconds() -> u64 {
    24 * 60 * 60
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: ByteSize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            user_agent: default_user_agent(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    concat!("linkcache/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_body_bytes() -> ByteSize {
    ByteSize(10 * 1024 * 1024) // 10 MB
}

/// Fallback thumbnails appended to every `images` field
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThumbnailConfig {
    #[serde(default = "default_thumbnail")]
    pub default: String,
    pub image: Option<String>,
    pub audio: Option<String>,
    pub video: Option<String>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            default: default_thumbnail(),
            image: None,
            audio: None,
            video: None,
        }
    }
}

impl ThumbnailConfig {
    /// Per-kind override, else the shared default
    pub fn fallback_for(&self, kind: ResourceKind) -> &str {
        let specific = match kind {
            ResourceKind::Image => self.image.as_deref(),
            ResourceKind::Audio => self.audio.as_deref(),
            ResourceKind::Video => self.video.as_deref(),
            ResourceKind::Html | ResourceKind::Generic => None,
        };
        specific.unwrap_or(&self.default)
    }
}

fn default_thumbnail() -> String {
    "/static/thumbnails/link.png".to_string()
}
