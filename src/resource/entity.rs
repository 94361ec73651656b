use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::identity::ResourceIdentity;
use super::record::{BasicInfo, ClassificationRecord};
use super::{ResourceError, Result};
use crate::cache::CacheStore;
use crate::cache::keys::{BASIC_FIELD, NAMESPACE_PREFIX, field_namespace};
use crate::fetch::Fetcher;
use crate::handlers::{ComputeInput, FieldKind, Handler, ResourceKind, ResourceTypeRegistry};
use crate::observability::Metrics;

static FIELD_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]+$").expect("Invalid field name regex"));

fn validate_field_name(field: &str) -> Result<()> {
    if FIELD_NAME.is_match(field) {
        Ok(())
    } else {
        Err(ResourceError::BadFieldRequest(field.to_string()))
    }
}

/// Shared collaborators handed from the resolver to each resource
#[derive(Clone)]
pub(super) struct Ports {
    pub cache: Arc<dyn CacheStore>,
    pub fetcher: Arc<dyn Fetcher>,
    pub registry: Arc<ResourceTypeRegistry>,
    pub metrics: Arc<Metrics>,
}

/// A classified URL whose fields are computed on first demand
///
/// Each field is looked up in the instance's own field cache, then in the
/// persistent cache under `link_<field>`, and only then computed. Computed
/// values are written to both tiers with the identity's expiry.
pub struct Resource {
    identity: ResourceIdentity,
    basic: BasicInfo,
    handler: Handler,
    fields: HashMap<String, Value>,
    fallback_thumbnail: String,
    ports: Ports,
}

impl Resource {
    pub(super) fn new(
        identity: ResourceIdentity,
        basic: BasicInfo,
        fields: HashMap<String, Value>,
        fallback_thumbnail: String,
        ports: Ports,
    ) -> Self {
        Self {
            handler: Handler::new(basic.handler_type),
            identity,
            basic,
            fields,
            fallback_thumbnail,
            ports,
        }
    }

    pub fn url(&self) -> &str {
        &self.identity.url
    }

    pub fn kind(&self) -> ResourceKind {
        self.handler.kind()
    }

    pub fn cache_key(&self) -> &str {
        &self.identity.cache_key
    }

    pub fn mime_type(&self) -> &str {
        &self.basic.mime_type
    }

    pub fn identity(&self) -> &ResourceIdentity {
        &self.identity
    }

    /// Field names this resource's handler can compute, sorted
    pub fn supported_fields(&self) -> Vec<&'static str> {
        self.handler.field_names()
    }

    /// Value of `field`, or `None` when the handler does not support it
    pub async fn get(&mut self, field: &str) -> Result<Option<Value>> {
        self.get_with(field, false).await
    }

    /// Like [`Resource::get`]; `force_refresh` skips both cache tiers and
    /// recomputes, overwriting what was cached
    pub async fn get_with(&mut self, field: &str, force_refresh: bool) -> Result<Option<Value>> {
        validate_field_name(field)?;

        let Some(kind) = self.handler.field(field) else {
            debug!(url = %self.identity.url, field, "Field not supported by handler");
            return Ok(None);
        };

        if !force_refresh {
            if let Some(value) = self.fields.get(field) {
                self.ports.metrics.memory_hit();
                return Ok(Some(value.clone()));
            }

            let namespace = field_namespace(field);
            if let Some(entry) = self.ports.cache.get(&namespace, &self.identity.cache_key).await? {
                debug!(url = %self.identity.url, field, "Persistent cache hit");
                self.ports.metrics.persistent_hits(1);
                self.fields.insert(field.to_string(), entry.data.clone());
                return Ok(Some(entry.data));
            }
        }

        self.compute_and_store(kind).await.map(Some)
    }

    /// Values of every supported field in `fields`
    ///
    /// Field-cache hits are taken first, the remainder is requested from the
    /// persistent cache in one batch, and whatever is still missing is
    /// computed. Unsupported names are left out of the result.
    pub async fn get_all(&mut self, fields: &[&str]) -> Result<HashMap<String, Value>> {
        for field in fields {
            validate_field_name(field)?;
        }

        let mut found = HashMap::new();
        let mut missing: Vec<(String, FieldKind)> = Vec::new();

        for &field in fields {
            let Some(kind) = self.handler.field(field) else {
                continue;
            };
            if found.contains_key(field) || missing.iter().any(|(name, _)| name == field) {
                continue;
            }
            match self.fields.get(field) {
                Some(value) => {
                    self.ports.metrics.memory_hit();
                    found.insert(field.to_string(), value.clone());
                }
                None => missing.push((field.to_string(), kind)),
            }
        }

        if missing.is_empty() {
            return Ok(found);
        }

        let names: Vec<String> = missing.iter().map(|(name, _)| name.clone()).collect();
        let hits = self
            .ports
            .cache
            .get_all(&self.identity.cache_key, &names, NAMESPACE_PREFIX)
            .await?;
        debug!(
            url = %self.identity.url,
            requested = names.len(),
            hits = hits.len(),
            "Batch persistent cache lookup"
        );
        self.ports.metrics.persistent_hits(hits.len() as u64);

        // hits land in the field cache before any compute reads from it
        for (name, entry) in hits {
            self.fields.insert(name, entry.data);
        }

        for (name, kind) in missing {
            let value = match self.fields.get(&name) {
                Some(value) => value.clone(),
                None => self.compute_and_store(kind).await?,
            };
            found.insert(name, value);
        }

        Ok(found)
    }

    /// Raw response body, decoded from the `basic` field in the field cache;
    /// empty until `basic` has been loaded
    pub fn body(&self) -> Result<Vec<u8>> {
        match self.fields.get(BASIC_FIELD) {
            Some(value) => {
                let record: ClassificationRecord = serde_json::from_value(value.clone())?;
                record.decode_body()
            }
            None => Ok(Vec::new()),
        }
    }

    async fn compute_and_store(&mut self, kind: FieldKind) -> Result<Value> {
        let value = self.compute(kind).await?;
        self.store(kind.name(), value.clone()).await?;
        self.ports.metrics.computed();
        debug!(url = %self.identity.url, field = kind.name(), "Computed field");
        Ok(value)
    }

    async fn store(&mut self, field: &str, value: Value) -> Result<()> {
        self.ports
            .cache
            .store(
                &field_namespace(field),
                &self.identity.cache_key,
                value.clone(),
                self.identity.expires_at,
            )
            .await?;
        self.fields.insert(field.to_string(), value);
        Ok(())
    }

    async fn compute(&mut self, kind: FieldKind) -> Result<Value> {
        if kind == FieldKind::Basic {
            // markup parsed from the previous body must not outlive it
            self.handler.reset();
            return self.fetch_basic().await;
        }

        let body = if self.handler.needs_body(kind) {
            self.load_body().await?
        } else {
            Vec::new()
        };

        let input = ComputeInput {
            url: &self.identity.url,
            mime_type: &self.basic.mime_type,
            body: &body,
            fallback_thumbnail: &self.fallback_thumbnail,
        };

        self.handler
            .compute(kind, &input)
            .map_err(|e| ResourceError::Compute {
                field: kind.name().to_string(),
                message: e.to_string(),
            })
    }

    async fn fetch_basic(&self) -> Result<Value> {
        let record = ClassificationRecord::fetch(
            self.ports.fetcher.as_ref(),
            &self.ports.registry,
            &self.ports.metrics,
            &self.identity.url,
        )
        .await?;
        Ok(serde_json::to_value(record)?)
    }

    /// Body for handlers that read it, loading `basic` through the cache tiers
    async fn load_body(&mut self) -> Result<Vec<u8>> {
        if !self.fields.contains_key(BASIC_FIELD) {
            let namespace = field_namespace(BASIC_FIELD);
            let cached = self.ports.cache.get(&namespace, &self.identity.cache_key).await?;

            match cached.and_then(|entry| ClassificationRecord::from_cached(entry.data)) {
                Some(record) => {
                    self.ports.metrics.persistent_hits(1);
                    self.fields
                        .insert(BASIC_FIELD.to_string(), serde_json::to_value(record)?);
                }
                None => {
                    let value = self.fetch_basic().await?;
                    self.store(BASIC_FIELD, value).await?;
                    self.ports.metrics.computed();
                }
            }
        } else {
            self.ports.metrics.memory_hit();
        }

        self.body()
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("identity", &self.identity)
            .field("basic", &self.basic)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
