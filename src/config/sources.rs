use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "LINKCACHE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/linkcache.toml";
const ENV_PREFIX: &str = "LINKCACHE";
const ENV_SEPARATOR: &str = "__";

/// Load configuration with priority (lowest first):
/// 1. Struct defaults
/// 2. TOML file (if present)
/// 3. `.env` file (via dotenvy)
/// 4. Process environment
pub fn load() -> Result<Config, ConfigError> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Load from an explicit file path plus environment overrides
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Loading configuration");
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            path = %config_path.display(),
            "Configuration file not found, using defaults and environment overrides"
        );
    }

    // LINKCACHE__CACHE__TTL_SECONDS -> cache.ttl_seconds
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheBackend;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.cache.ttl_seconds, 86_400);
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "127.0.0.1:9000"

[cache]
backend = "memory"
ttl_seconds = 60

[fetch]
max_body_bytes = "2MB"
user_agent = "probe/1.0"

[thumbnails]
default = "/t.png"
audio = "/audio.png"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.ttl_seconds, 60);
        assert_eq!(config.fetch.max_body_bytes.as_u64(), 2 * 1024 * 1024);
        assert_eq!(config.fetch.user_agent, "probe/1.0");
        assert_eq!(config.fetch.max_retries, 2);
        assert_eq!(config.thumbnails.audio.as_deref(), Some("/audio.png"));
        assert_eq!(config.thumbnails.image, None);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        fs::write(&config_path, "[cache]\nbackend = \"redis\"\n").unwrap();

        assert!(load_from_sources(config_path).is_err());
    }
}
