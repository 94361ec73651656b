//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use linkcache::cache::{self, CacheEntry, CacheStore, MemoryCache};
use linkcache::fetch::{self, FetchError, FetchedBody, Fetcher};

pub const HTML_PAGE: &str = "http://example.com/page.html";
pub const CAT_IMAGE: &str = "http://example.com/cat.jpg";
pub const UNREACHABLE: &str = "http://unreachable.invalid/";

/// Serves canned responses; any other URL fails like a refused connection
#[derive(Default)]
pub struct StubFetcher {
    responses: HashMap<String, (String, Vec<u8>)>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, mime_type: &str, body: &[u8]) -> Self {
        self.responses
            .insert(url.to_string(), (mime_type.to_string(), body.to_vec()));
        self
    }

    /// The pages most tests need
    pub fn standard() -> Self {
        Self::new()
            .with(HTML_PAGE, "text/html", b"<!doctype html><title>Hi</title>")
            .with(CAT_IMAGE, "image/jpeg", b"\xFF\xD8\xFF\xE0")
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// While set, every URL fails, known or not
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> fetch::Result<FetchedBody> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(FetchError::RequestFailed(format!("connection reset: {url}")));
        }
        match self.responses.get(url) {
            Some((mime_type, body)) => Ok(FetchedBody {
                body: Bytes::from(body.clone()),
                mime_type: mime_type.clone(),
            }),
            None => Err(FetchError::RequestFailed(format!("connection refused: {url}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheCall {
    Get(String),
    GetAll(Vec<String>),
    Store(String),
}

/// [`MemoryCache`] that records every call made to it
#[derive(Default)]
pub struct RecordingCache {
    inner: MemoryCache,
    calls: Mutex<Vec<CacheCall>>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<CacheCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: CacheCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CacheStore for RecordingCache {
    async fn get(&self, namespace: &str, key: &str) -> cache::Result<Option<CacheEntry>> {
        self.record(CacheCall::Get(namespace.to_string()));
        self.inner.get(namespace, key).await
    }

    async fn store(
        &self,
        namespace: &str,
        key: &str,
        data: Value,
        expires_at: i64,
    ) -> cache::Result<()> {
        self.record(CacheCall::Store(namespace.to_string()));
        self.inner.store(namespace, key, data, expires_at).await
    }

    async fn get_all(
        &self,
        key: &str,
        fields: &[String],
        namespace_prefix: &str,
    ) -> cache::Result<HashMap<String, CacheEntry>> {
        self.record(CacheCall::GetAll(fields.to_vec()));
        self.inner.get_all(key, fields, namespace_prefix).await
    }
}
