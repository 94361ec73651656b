use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use tracing::info;

use super::{
    context::{REQUEST_ID_HEADER, RequestContext},
    error::ApiError,
    models::{HealthResponse, ResourceQuery, ResourceResponse},
    state::AppState,
    utils::parse_fields,
};

/// Resolve a URL (GET /resource)
///
/// ## Flow:
/// 1. Build the [`RequestContext`] from headers
/// 2. Resolve the URL into a resource (cached classification or fetch)
/// 3. Collect the requested fields; `refresh=true` recomputes each one
/// 4. Return the summary with the supported fields
pub async fn get_resource(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ResourceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = RequestContext::from_headers(&headers);
    resolve(&state, &ctx, query).await.map(|response| {
        let mut response_headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
            response_headers.insert(REQUEST_ID_HEADER, value);
        }
        (StatusCode::OK, response_headers, Json(response))
    })
}

async fn resolve(
    state: &AppState,
    ctx: &RequestContext,
    query: ResourceQuery,
) -> Result<ResourceResponse, ApiError> {
    let fields = parse_fields(query.fields.as_deref());
    info!(
        request_id = %ctx.request_id,
        url = %query.url,
        mobile = ctx.mobile,
        refresh = query.refresh,
        "Resolving resource"
    );

    let mut resource = state.resolver.instance(&query.url).await?;

    let mut values = BTreeMap::new();
    if query.refresh {
        for field in &fields {
            if let Some(value) = resource.get_with(field, true).await? {
                values.insert(field.clone(), value);
            }
        }
    } else {
        let names: Vec<&str> = fields.iter().map(String::as_str).collect();
        values.extend(resource.get_all(&names).await?);
    }

    Ok(ResourceResponse {
        url: resource.url().to_string(),
        kind: resource.kind(),
        cache_key: resource.cache_key().to_string(),
        mime_type: resource.mime_type().to_string(),
        expires_at: resource.identity().expires_at,
        supported_fields: resource
            .supported_fields()
            .into_iter()
            .map(str::to_string)
            .collect(),
        fields: values,
    })
}

/// Health check endpoint (GET /health)
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let response = HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        metrics: state.resolver.metrics().snapshot(),
    };

    (StatusCode::OK, Json(response))
}
