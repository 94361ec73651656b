//! URL canonicalization and validation

use url::Url;

/// Canonicalizes and validates URL strings before they are hashed
pub trait UrlNormalizer: Send + Sync {
    fn normalize(&self, url: &str) -> String;

    fn validate(&self, url: &str) -> bool;
}

/// Default normalizer built on the `url` crate
///
/// - surrounding whitespace is trimmed
/// - a missing scheme becomes `http://`
/// - host is lowercased, default ports and fragments are dropped
/// - only `http`/`https` URLs with a host validate
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardNormalizer;

impl StandardNormalizer {
    fn parse(url: &str) -> Option<Url> {
        let trimmed = url.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return None;
        }

        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{}", trimmed.trim_start_matches('/'))
        };

        let mut parsed = Url::parse(&candidate).ok()?;
        parsed.set_fragment(None);
        Some(parsed)
    }
}

impl UrlNormalizer for StandardNormalizer {
    fn normalize(&self, url: &str) -> String {
        match Self::parse(url) {
            Some(parsed) => parsed.to_string(),
            None => url.trim().to_string(),
        }
    }

    fn validate(&self, url: &str) -> bool {
        Url::parse(url)
            .map(|parsed| {
                matches!(parsed.scheme(), "http" | "https")
                    && parsed.host_str().is_some_and(|host| !host.is_empty())
            })
            .unwrap_or(false)
    }
}
