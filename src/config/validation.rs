use super::models::{CacheBackend, Config};
use thiserror::Error;

const MAX_RETRIES_LIMIT: u32 = 10;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("cache.ttl_seconds must be positive")]
    ZeroTtl,

    #[error("cache.path must be set when the fjall backend is selected")]
    MissingCachePath,

    #[error("fetch.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("fetch.max_body_bytes must be positive")]
    ZeroBodyLimit,

    #[error("fetch.max_retries ({actual}) exceeds limit of {limit}")]
    TooManyRetries { actual: u32, limit: u32 },

    #[error("server.max_concurrent_requests must be positive")]
    ZeroConcurrency,

    #[error("thumbnails.default must not be empty")]
    EmptyDefaultThumbnail,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_cache(config)?;
    validate_fetch(config)?;
    validate_server(config)?;
    validate_thumbnails(config)?;
    Ok(())
}

fn validate_cache(config: &Config) -> Result<(), ValidationError> {
    if config.cache.ttl_seconds == 0 {
        return Err(ValidationError::ZeroTtl);
    }
    if config.cache.backend == CacheBackend::Fjall && config.cache.path.as_os_str().is_empty() {
        return Err(ValidationError::MissingCachePath);
    }
    Ok(())
}

fn validate_fetch(config: &Config) -> Result<(), ValidationError> {
    let fetch = &config.fetch;

    if fetch.user_agent.trim().is_empty() {
        return Err(ValidationError::EmptyUserAgent);
    }
    if fetch.max_body_bytes.as_u64() == 0 {
        return Err(ValidationError::ZeroBodyLimit);
    }
    if fetch.max_retries > MAX_RETRIES_LIMIT {
        return Err(ValidationError::TooManyRetries {
            actual: fetch.max_retries,
            limit: MAX_RETRIES_LIMIT,
        });
    }
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    if config.server.max_concurrent_requests == 0 {
        return Err(ValidationError::ZeroConcurrency);
    }
    Ok(())
}

fn validate_thumbnails(config: &Config) -> Result<(), ValidationError> {
    if config.thumbnails.default.trim().is_empty() {
        return Err(ValidationError::EmptyDefaultThumbnail);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::ByteSize;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_ttl() {
        let mut config = Config::default();
        config.cache.ttl_seconds = 0;
        assert!(matches!(validate(&config), Err(ValidationError::ZeroTtl)));
    }

    #[test]
    fn test_empty_path_only_matters_for_fjall() {
        let mut config = Config::default();
        config.cache.path = PathBuf::new();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::MissingCachePath)
        ));

        config.cache.backend = CacheBackend::Memory;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_fetch_limits() {
        let mut config = Config::default();
        config.fetch.user_agent = "  ".to_string();
        assert!(matches!(validate(&config), Err(ValidationError::EmptyUserAgent)));

        let mut config = Config::default();
        config.fetch.max_body_bytes = ByteSize(0);
        assert!(matches!(validate(&config), Err(ValidationError::ZeroBodyLimit)));

        let mut config = Config::default();
        config.fetch.max_retries = 11;
        assert!(matches!(
            validate(&config),
            Err(ValidationError::TooManyRetries { actual: 11, limit: 10 })
        ));
    }

    #[test]
    fn test_server_and_thumbnails() {
        let mut config = Config::default();
        config.server.max_concurrent_requests = 0;
        assert!(matches!(validate(&config), Err(ValidationError::ZeroConcurrency)));

        let mut config = Config::default();
        config.thumbnails.default = String::new();
        assert!(matches!(
            validate(&config),
            Err(ValidationError::EmptyDefaultThumbnail)
        ));
    }
}
