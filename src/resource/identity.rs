use serde::Serialize;
use std::time::Duration;

use crate::cache::unix_now;
use crate::codec::cache_key;

/// Who a resource is and how long its cached fields live
///
/// Fixed when the resource is constructed; every field written by the same
/// instance shares `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceIdentity {
    pub url: String,
    pub cache_key: String,
    pub ttl_seconds: u64,
    pub expires_at: i64,
}

impl ResourceIdentity {
    /// `url` must already be normalized
    pub fn new(url: String, ttl: Duration) -> Self {
        Self::at(url, ttl, unix_now())
    }

    pub fn at(url: String, ttl: Duration, now: i64) -> Self {
        let ttl_seconds = ttl.as_secs();
        let expires_at = now.saturating_add(i64::try_from(ttl_seconds).unwrap_or(i64::MAX));

        Self {
            cache_key: cache_key(&url),
            url,
            ttl_seconds,
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_fields() {
        let identity =
            ResourceIdentity::at("http://example.com/".to_string(), Duration::from_secs(60), 1_000);

        assert_eq!(identity.url, "http://example.com/");
        assert_eq!(identity.cache_key, cache_key("http://example.com/"));
        assert_eq!(identity.ttl_seconds, 60);
        assert_eq!(identity.expires_at, 1_060);
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let identity = ResourceIdentity::at("http://e.com/".to_string(), Duration::MAX, 10);
        assert_eq!(identity.expires_at, i64::MAX);
    }
}
