use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{CacheEntry, CacheStore, Result, unix_now};

/// In-process cache backend
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<(String, String), CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop a single entry; returns whether it existed
    pub async fn evict(&self, namespace: &str, key: &str) -> bool {
        self.entries
            .write()
            .await
            .remove(&(namespace.to_string(), key.to_string()))
            .is_some()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry>> {
        let entries = self.entries.read().await;
        let entry = entries
            .get(&(namespace.to_string(), key.to_string()))
            .filter(|entry| !entry.is_expired(unix_now()))
            .cloned();
        Ok(entry)
    }

    async fn store(
        &self,
        namespace: &str,
        key: &str,
        data: Value,
        expires_at: i64,
    ) -> Result<()> {
        self.entries.write().await.insert(
            (namespace.to_string(), key.to_string()),
            CacheEntry { data, expires_at },
        );
        tracing::debug!(namespace, key, "Stored cache entry");
        Ok(())
    }

    async fn get_all(
        &self,
        key: &str,
        fields: &[String],
        namespace_prefix: &str,
    ) -> Result<HashMap<String, CacheEntry>> {
        let now = unix_now();
        let entries = self.entries.read().await;

        let found = fields
            .iter()
            .filter_map(|field| {
                let id = (format!("{}{}", namespace_prefix, field), key.to_string());
                entries
                    .get(&id)
                    .filter(|entry| !entry.is_expired(now))
                    .map(|entry| (field.clone(), entry.clone()))
            })
            .collect();

        Ok(found)
    }
}
