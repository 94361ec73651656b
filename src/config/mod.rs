//! Configuration management for linkcache
//!
//! Settings are layered from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use linkcache::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Cache TTL: {}s", config.cache.ttl_seconds);
//! ```
//!
//! # Environment Variables
//!
//! Any key can be overridden with `LINKCACHE__<section>__<key>`:
//! - `LINKCACHE__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `LINKCACHE__CACHE__BACKEND=memory`
//! - `LINKCACHE__FETCH__MAX_BODY_BYTES=2MB`
//!
//! # Configuration File
//!
//! Read from `config/linkcache.toml` unless `LINKCACHE_CONFIG` points elsewhere.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{CacheBackend, CacheConfig, Config, FetchConfig, ServerConfig, ThumbnailConfig};
pub use validation::ValidationError;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_seconds)
    }
}
