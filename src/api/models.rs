//! Request and response bodies of the HTTP API

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::handlers::ResourceKind;
use crate::observability::MetricsSnapshot;

/// Query string of `GET /resource`
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceQuery {
    pub url: String,
    /// Comma-separated field names
    pub fields: Option<String>,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceResponse {
    pub url: String,
    pub kind: ResourceKind,
    pub cache_key: String,
    pub mime_type: String,
    /// Unix seconds after which cached fields of this resolution go stale
    pub expires_at: i64,
    /// Every field name the resource's handler can compute
    pub supported_fields: Vec<String>,
    /// Requested fields the resource supports; unsupported names are omitted
    pub fields: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}
