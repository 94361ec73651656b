//! HTTP client for fetching resources

use async_trait::async_trait;
use bytes::BytesMut;
use reqwest::{Client, header::CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, warn};

use super::{FetchError, FetchedBody, Fetcher, Result};
use crate::config::FetchConfig;

/// Upper bound on the delay between two attempts
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Exponential delay before retry number `attempt` (1-based), capped at [`MAX_BACKOFF`]
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.checked_mul(factor).map_or(MAX_BACKOFF, |delay| delay.min(MAX_BACKOFF))
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Extra attempts after the first one
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub user_agent: String,
    pub max_body_bytes: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_backoff: Duration::from_millis(500),
            user_agent: "linkcache/0.1.0".to_string(),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

impl From<&FetchConfig> for HttpConfig {
    fn from(config: &FetchConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            user_agent: config.user_agent.clone(),
            max_body_bytes: config.max_body_bytes.as_u64(),
        }
    }
}

/// reqwest-backed [`Fetcher`]
pub struct HttpFetcher {
    client: Client,
    config: HttpConfig,
}

impl HttpFetcher {
    pub fn new(config: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchedBody> {
        debug!(url, "Starting fetch");

        let mut response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else if e.is_redirect() {
                FetchError::TooManyRedirects
            } else if e.is_builder() {
                FetchError::InvalidUrl(e.to_string())
            } else {
                FetchError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let limit = self.config.max_body_bytes;
        if let Some(size) = response.content_length() {
            if size > limit {
                return Err(FetchError::BodyTooLarge { size, limit });
            }
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<mime::Mime>().ok())
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());

        // Content-Length can be absent or wrong, so the limit is enforced while reading
        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::RequestFailed(format!("Failed to read body: {}", e)))?
        {
            let size = (body.len() + chunk.len()) as u64;
            if size > limit {
                return Err(FetchError::BodyTooLarge { size, limit });
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url, size = body.len(), mime_type, "Fetch completed");

        Ok(FetchedBody {
            body: body.freeze(),
            mime_type,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedBody> {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match self.fetch_once(url).await {
                Ok(fetched) => {
                    if attempts > 1 {
                        debug!(url, attempts, "Fetch succeeded after retry");
                    }
                    return Ok(fetched);
                }
                Err(e) if !e.is_retryable() || attempts > self.config.max_retries => {
                    warn!(url, attempts, error = %e, "Fetch failed");
                    return Err(e);
                }
                Err(e) => {
                    warn!(url, attempts, error = %e, "Fetch failed, retrying");
                    let backoff = backoff_delay(self.config.retry_backoff, attempts);
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, http::header, routing::get};
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    async fn spawn_server() -> SocketAddr {
        let app = Router::new()
            .route(
                "/page.html",
                get(|| async {
                    (
                        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                        "<!doctype html><title>Hi</title>",
                    )
                }),
            )
            .route("/raw", get(|| async { "plain bytes" }))
            .route("/big", get(|| async { "x".repeat(4096) }));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn test_config() -> HttpConfig {
        HttpConfig {
            max_retries: 0,
            ..HttpConfig::default()
        }
    }

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.user_agent, "linkcache/0.1.0");
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(1));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, 40), MAX_BACKOFF);
        assert_eq!(backoff_delay(Duration::from_millis(u64::MAX), 2), MAX_BACKOFF);
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_mime_essence() {
        let addr = spawn_server().await;
        let fetcher = HttpFetcher::new(test_config()).unwrap();

        let fetched = fetcher
            .fetch(&format!("http://{}/page.html", addr))
            .await
            .unwrap();

        assert_eq!(fetched.mime_type, "text/html");
        assert_eq!(&fetched.body[..], b"<!doctype html><title>Hi</title>");
    }

    #[tokio::test]
    async fn test_fetch_reports_status() {
        let addr = spawn_server().await;
        let fetcher = HttpFetcher::new(test_config()).unwrap();

        let err = fetcher
            .fetch(&format!("http://{}/missing", addr))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_enforces_body_limit() {
        let addr = spawn_server().await;
        let fetcher = HttpFetcher::new(HttpConfig {
            max_body_bytes: 1024,
            ..test_config()
        })
        .unwrap();

        let err = fetcher
            .fetch(&format!("http://{}/big", addr))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::BodyTooLarge { limit: 1024, .. }));
    }

    #[tokio::test]
    async fn test_plain_text_mime() {
        let addr = spawn_server().await;
        let fetcher = HttpFetcher::new(test_config()).unwrap();

        let fetched = fetcher.fetch(&format!("http://{}/raw", addr)).await.unwrap();
        assert_eq!(fetched.mime_type, "text/plain");
    }
}
