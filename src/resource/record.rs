use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ResourceError, Result};
use crate::codec::{decode_body, encode_body};
use crate::fetch::Fetcher;
use crate::handlers::{ResourceKind, ResourceTypeRegistry};
use crate::observability::Metrics;

/// Value of the `basic` field, persisted under `link_basic`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub url: String,
    pub mime_type: String,
    pub handler_type: ResourceKind,
    /// Gzip-compressed, base64-encoded response body
    #[serde(default)]
    pub body: String,
}

/// A classification record without its body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BasicInfo {
    pub url: String,
    pub mime_type: String,
    pub handler_type: ResourceKind,
}

impl ClassificationRecord {
    pub fn new(url: &str, mime_type: &str, kind: ResourceKind, body: &[u8]) -> Result<Self> {
        Ok(Self {
            url: url.to_string(),
            mime_type: mime_type.to_string(),
            handler_type: kind,
            body: encode_body(body)?,
        })
    }

    /// Stand-in for a URL that could not be fetched
    pub fn unreachable(url: &str) -> Self {
        Self {
            url: url.to_string(),
            mime_type: String::new(),
            handler_type: ResourceKind::Generic,
            body: String::new(),
        }
    }

    /// Fetch `url` and classify the response
    pub async fn fetch(
        fetcher: &dyn Fetcher,
        registry: &ResourceTypeRegistry,
        metrics: &Metrics,
        url: &str,
    ) -> Result<Self> {
        let fetched = match fetcher.fetch(url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                metrics.fetch_failed();
                return Err(ResourceError::FetchFailed(e));
            }
        };
        metrics.fetched();

        let kind = registry.classify(url, &fetched.mime_type, &fetched.body);
        metrics.classified();
        info!(
            url,
            mime_type = %fetched.mime_type,
            %kind,
            bytes = fetched.body.len(),
            "Fetched and classified resource"
        );

        Self::new(url, &fetched.mime_type, kind, &fetched.body)
    }

    /// Parse a cached value; a malformed record or an undecodable body is
    /// treated as absent
    pub fn from_cached(value: serde_json::Value) -> Option<Self> {
        let record: Self = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "Discarding malformed classification record");
                return None;
            }
        };

        if let Err(e) = decode_body(&record.body) {
            warn!(url = %record.url, error = %e, "Discarding classification record with undecodable body");
            return None;
        }

        Some(record)
    }

    pub fn decode_body(&self) -> Result<Vec<u8>> {
        Ok(decode_body(&self.body)?)
    }

    pub fn strip(&self) -> BasicInfo {
        BasicInfo {
            url: self.url.clone(),
            mime_type: self.mime_type.clone(),
            handler_type: self.handler_type,
        }
    }
}
