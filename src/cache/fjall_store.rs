use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::keys::{decode_entry_key, encode_entry_key};
use super::{CacheEntry, CacheStore, Result, unix_now};

/// Fjall-backed persistent cache
///
/// All namespaces share the `entries` partition, keyed `{namespace}:{key}`
/// with JSON-encoded [`CacheEntry`] values.
#[derive(Clone)]
pub struct FjallCache {
    keyspace: Keyspace,
    entries: PartitionHandle,
}

/// Result of a pruning pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneStats {
    pub scanned: usize,
    pub pruned: usize,
}

#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub total: usize,
    pub per_namespace: BTreeMap<String, usize>,
}

impl FjallCache {
    /// Open or create a cache at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening Fjall cache at: {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;
        let entries = keyspace.open_partition("entries", PartitionCreateOptions::default())?;

        info!("Fjall cache opened successfully");
        Ok(Self { keyspace, entries })
    }

    fn read_entry(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry>> {
        let Some(raw) = self.entries.get(encode_entry_key(namespace, key))? else {
            return Ok(None);
        };

        match serde_json::from_slice::<CacheEntry>(&raw) {
            Ok(entry) if entry.is_expired(unix_now()) => Ok(None),
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!(namespace, key, error = %e, "Undecodable cache entry, treating as miss");
                Ok(None)
            }
        }
    }

    /// Remove expired and undecodable entries, then flush to disk
    pub fn prune_expired(&self) -> Result<PruneStats> {
        info!("Starting cache pruning");
        let now = unix_now();
        let mut stats = PruneStats::default();
        let mut doomed = Vec::new();

        for item in self.entries.iter() {
            let (key, value) = item?;
            stats.scanned += 1;

            let expired = serde_json::from_slice::<CacheEntry>(&value)
                .map(|entry| entry.is_expired(now))
                .unwrap_or(true);
            if expired {
                doomed.push(key);
            }
        }

        for key in doomed {
            self.entries.remove(key)?;
            stats.pruned += 1;
        }

        self.keyspace.persist(PersistMode::SyncAll)?;
        info!("Pruning completed: {:?}", stats);
        Ok(stats)
    }

    /// Entry counts per namespace, expired entries included
    pub fn stats(&self) -> Result<StoreStats> {
        let mut stats = StoreStats::default();

        for item in self.entries.iter() {
            let (key, _) = item?;
            stats.total += 1;
            if let Some((namespace, _)) = decode_entry_key(&key) {
                *stats.per_namespace.entry(namespace).or_default() += 1;
            }
        }

        Ok(stats)
    }
}

#[async_trait]
impl CacheStore for FjallCache {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<CacheEntry>> {
        self.read_entry(namespace, key)
    }

    async fn store(
        &self,
        namespace: &str,
        key: &str,
        data: Value,
        expires_at: i64,
    ) -> Result<()> {
        let value = serde_json::to_vec(&CacheEntry { data, expires_at })?;
        self.entries.insert(encode_entry_key(namespace, key), value)?;
        debug!(namespace, key, "Stored cache entry");
        Ok(())
    }

    async fn get_all(
        &self,
        key: &str,
        fields: &[String],
        namespace_prefix: &str,
    ) -> Result<HashMap<String, CacheEntry>> {
        let mut found = HashMap::new();
        for field in fields {
            let namespace = format!("{}{}", namespace_prefix, field);
            if let Some(entry) = self.read_entry(&namespace, key)? {
                found.insert(field.clone(), entry);
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_cache() -> (FjallCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = FjallCache::open(temp_dir.path().join("test_cache")).unwrap();
        (cache, temp_dir)
    }

    #[test]
    fn test_open_cache() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FjallCache::open(temp_dir.path().join("nested").join("cache"));
        assert!(cache.is_ok());
    }

    #[tokio::test]
    async fn test_store_and_get() {
        let (cache, _temp) = create_test_cache();
        let expires = unix_now() + 3600;

        cache
            .store("link_meta", "abc", json!({"title": "Hi"}), expires)
            .await
            .unwrap();

        let entry = cache.get("link_meta", "abc").await.unwrap().unwrap();
        assert_eq!(entry.data["title"], "Hi");
        assert_eq!(entry.expires_at, expires);
        assert!(cache.get("link_images", "abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss() {
        let (cache, _temp) = create_test_cache();
        cache
            .store("link_meta", "abc", json!(1), unix_now() - 10)
            .await
            .unwrap();

        assert!(cache.get("link_meta", "abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_miss() {
        let (cache, _temp) = create_test_cache();
        cache
            .entries
            .insert(encode_entry_key("link_meta", "abc"), b"{not json".to_vec())
            .unwrap();

        assert!(cache.get("link_meta", "abc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_batches_fields() {
        let (cache, _temp) = create_test_cache();
        let expires = unix_now() + 3600;
        cache.store("link_meta", "abc", json!("m"), expires).await.unwrap();
        cache.store("link_feeds", "abc", json!("f"), expires).await.unwrap();
        cache.store("link_meta", "other", json!("x"), expires).await.unwrap();

        let fields = vec!["meta".to_string(), "images".to_string(), "feeds".to_string()];
        let found = cache.get_all("abc", &fields, "link_").await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found["meta"].data, json!("m"));
        assert_eq!(found["feeds"].data, json!("f"));
    }

    #[tokio::test]
    async fn test_prune_expired() {
        let (cache, _temp) = create_test_cache();
        let now = unix_now();
        cache.store("link_meta", "live", json!(1), now + 3600).await.unwrap();
        cache.store("link_meta", "dead", json!(2), now - 1).await.unwrap();
        cache
            .entries
            .insert(encode_entry_key("link_basic", "junk"), b"garbage".to_vec())
            .unwrap();

        let stats = cache.prune_expired().unwrap();
        assert_eq!(stats, PruneStats { scanned: 3, pruned: 2 });

        let remaining = cache.stats().unwrap();
        assert_eq!(remaining.total, 1);
        assert_eq!(remaining.per_namespace.get("link_meta"), Some(&1));
    }
}
