//! Persistent cache port for resource fields
//!
//! Fields are addressed by `(namespace, key)` where the namespace names the
//! field (`link_meta`) and the key identifies the resource (URL hash). Every
//! entry carries its own expiry; backends never hand out expired entries.
//!
//! ## Backends
//!
//! - [`MemoryCache`] - process-local map, used in tests and `backend = "memory"`
//! - [`FjallCache`] - embedded LSM store surviving restarts, with pruning
//!
//! A value a backend cannot decode is reported as a miss, not an error.

mod fjall_store;
pub mod keys;
mod memory;

pub use fjall_store::{FjallCache, PruneStats, StoreStats};
pub use memory::MemoryCache;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use time::OffsetDateTime;

use crate::config::{CacheBackend, CacheConfig};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Cached value with its absolute expiry (unix seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    pub expires_at: i64,
}

impl CacheEntry {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// Open the backend selected in configuration
pub fn open_store(config: &CacheConfig) -> Result<Arc<dyn CacheStore>> {
    let store: Arc<dyn CacheStore> = match config.backend {
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
        CacheBackend::Fjall => Arc::new(FjallCache::open(&config.path)?),
    };
    tracing::info!(backend = ?config.backend, "Opened cache backend");
    Ok(store)
}

/// Current time as unix seconds
pub fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Key-value store with per-entry expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetch one live entry
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry>>;

    /// Insert or overwrite an entry
    async fn store(&self, namespace: &str, key: &str, data: Value, expires_at: i64)
    -> Result<()>;

    /// Fetch every live entry of `key` among `fields`, looking each field up
    /// under `{namespace_prefix}{field}`. Missing fields are absent from the map.
    async fn get_all(
        &self,
        key: &str,
        fields: &[String],
        namespace_prefix: &str,
    ) -> Result<HashMap<String, CacheEntry>> {
        let mut found = HashMap::new();
        for field in fields {
            let namespace = format!("{}{}", namespace_prefix, field);
            if let Some(entry) = self.get(&namespace, key).await? {
                found.insert(field.clone(), entry);
            }
        }
        Ok(found)
    }
}
