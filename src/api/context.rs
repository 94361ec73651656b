use axum::http::{HeaderMap, header};
use uuid::Uuid;

use super::utils::is_mobile_user_agent;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request values read from headers once and passed down explicitly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Caller-supplied `X-Request-Id`, otherwise a fresh UUIDv7
    pub request_id: String,
    pub user_agent: Option<String>,
    pub mobile: bool,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let mobile = user_agent.as_deref().is_some_and(is_mobile_user_agent);

        Self {
            request_id,
            user_agent,
            mobile,
        }
    }
}
