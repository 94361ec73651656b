use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bon::Builder;
use tracing::{debug, warn};

use super::entity::{Ports, Resource};
use super::identity::ResourceIdentity;
use super::record::ClassificationRecord;
use super::{ResourceError, Result};
use crate::cache::keys::{BASIC_FIELD, field_namespace};
use crate::cache::{self, CacheStore};
use crate::config::{Config, ThumbnailConfig};
use crate::fetch::{Fetcher, HttpConfig, HttpFetcher};
use crate::handlers::ResourceTypeRegistry;
use crate::observability::Metrics;
use crate::url_norm::{StandardNormalizer, UrlNormalizer};

const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

fn default_normalizer() -> Arc<dyn UrlNormalizer> {
    Arc::new(StandardNormalizer)
}

/// Factory for [`Resource`] instances
///
/// Owns the shared ports; each call to [`Resolver::instance`] yields a fresh
/// resource with an empty field cache.
///
/// ```rust,ignore
/// let resolver = Resolver::builder()
///     .cache(Arc::new(MemoryCache::new()))
///     .fetcher(Arc::new(HttpFetcher::new(HttpConfig::default())?))
///     .build();
/// let mut resource = resolver.instance("example.com").await?;
/// let meta = resource.get("meta").await?;
/// ```
#[derive(Builder)]
pub struct Resolver {
    cache: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    #[builder(default = default_normalizer())]
    normalizer: Arc<dyn UrlNormalizer>,
    #[builder(default = Arc::new(ResourceTypeRegistry::with_defaults()))]
    registry: Arc<ResourceTypeRegistry>,
    #[builder(default = DEFAULT_TTL)]
    ttl: Duration,
    #[builder(default)]
    thumbnails: ThumbnailConfig,
    #[builder(default)]
    metrics: Arc<Metrics>,
}

impl Resolver {
    /// Resolver wired to the configured cache backend and an HTTP fetcher
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = cache::open_store(&config.cache)?;
        let fetcher = HttpFetcher::new(HttpConfig::from(&config.fetch))?;

        Ok(Self::builder()
            .cache(cache)
            .fetcher(Arc::new(fetcher))
            .ttl(config.ttl())
            .thumbnails(config.thumbnails.clone())
            .build())
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Normalize, classify and wrap `url`
    ///
    /// The classification record is read from `link_basic` when present,
    /// otherwise fetched and persisted. An unreachable URL yields a `Generic`
    /// resource with an empty body that is not persisted.
    pub async fn instance(&self, url: &str) -> Result<Resource> {
        let normalized = self.normalizer.normalize(url);
        if !self.normalizer.validate(&normalized) {
            return Err(ResourceError::InvalidUrl(url.to_string()));
        }

        let identity = ResourceIdentity::new(normalized, self.ttl);
        let mut seeded = HashMap::new();

        let record = match self.cached_record(&identity).await? {
            Some(record) => record,
            None => match ClassificationRecord::fetch(
                self.fetcher.as_ref(),
                &self.registry,
                &self.metrics,
                &identity.url,
            )
            .await
            {
                Ok(record) => {
                    self.cache
                        .store(
                            &field_namespace(BASIC_FIELD),
                            &identity.cache_key,
                            serde_json::to_value(&record)?,
                            identity.expires_at,
                        )
                        .await?;
                    record
                }
                Err(ResourceError::FetchFailed(e)) => {
                    warn!(url = %identity.url, error = %e, "Fetch failed, treating as generic resource");
                    let record = ClassificationRecord::unreachable(&identity.url);
                    seeded.insert(BASIC_FIELD.to_string(), serde_json::to_value(&record)?);
                    record
                }
                Err(e) => return Err(e),
            },
        };

        if !self.registry.contains(record.handler_type) {
            return Err(ResourceError::UnhandledResourceType(record.handler_type));
        }

        let fallback = self.thumbnails.fallback_for(record.handler_type).to_string();
        Ok(Resource::new(
            identity,
            record.strip(),
            seeded,
            fallback,
            Ports {
                cache: Arc::clone(&self.cache),
                fetcher: Arc::clone(&self.fetcher),
                registry: Arc::clone(&self.registry),
                metrics: Arc::clone(&self.metrics),
            },
        ))
    }

    async fn cached_record(&self, identity: &ResourceIdentity) -> Result<Option<ClassificationRecord>> {
        let entry = self
            .cache
            .get(&field_namespace(BASIC_FIELD), &identity.cache_key)
            .await?;

        let record = entry.and_then(|entry| ClassificationRecord::from_cached(entry.data));
        if record.is_some() {
            debug!(url = %identity.url, cache_key = %identity.cache_key, "Classification cache hit");
            self.metrics.persistent_hits(1);
        }
        Ok(record)
    }
}
