//! Mock HTTP server setup for integration tests

use async_trait::async_trait;
use http_response_cache::{
    CacheConfig, CacheKey, CacheStore, CachedClient, CachedClientBuilder, MemoryStore,
    PluginRegistry,
};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        init_tracing();
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Builder pointed at the mock server, without any hooks installed.
    pub fn client_builder(&self) -> CachedClientBuilder {
        CachedClient::builder().base_url(&self.base_url)
    }

    pub fn cached_client(&self, config: CacheConfig) -> CachedClient {
        self.client_builder()
            .with_cache(config)
            .build()
            .expect("client should build")
    }

    /// `{"a":1}` with the given status, expected to be hit `times` times.
    pub async fn mock_json(
        &mut self,
        method: &str,
        path: &str,
        status: usize,
        times: usize,
    ) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(r#"{"a":1}"#)
            .expect(times)
            .create_async()
            .await
    }

    pub async fn mock_json_with_query(
        &mut self,
        path: &str,
        name: &str,
        value: &str,
        times: usize,
    ) -> Mock {
        self.server
            .mock("GET", path)
            .match_query(Matcher::UrlEncoded(name.into(), value.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"{}":"{}"}}"#, name, value))
            .expect(times)
            .create_async()
            .await
    }
}

/// Memory store that counts reads and writes.
#[derive(Default)]
pub struct SpyStore {
    inner: MemoryStore,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
}

impl SpyStore {
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

/// Registry whose `spy` plugin always hands out the given store.
pub fn spy_registry(spy: &Arc<SpyStore>) -> PluginRegistry {
    let spy = spy.clone();
    PluginRegistry::new().with_plugin("spy", move |_cfg: &CacheConfig| {
        Ok(spy.clone() as Arc<dyn CacheStore>)
    })
}

#[async_trait]
impl CacheStore for SpyStore {
    async fn get(&self, key: &CacheKey) -> http_response_cache::Result<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }
    async fn set(
        &self,
        key: &CacheKey,
        value: &[u8],
        ttl: Duration,
    ) -> http_response_cache::Result<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl).await
    }
    async fn delete(&self, key: &CacheKey) -> http_response_cache::Result<bool> {
        self.inner.delete(key).await
    }
    async fn clear(&self) -> http_response_cache::Result<()> {
        self.inner.clear().await
    }
    async fn len(&self) -> http_response_cache::Result<usize> {
        self.inner.len().await
    }
    fn name(&self) -> &'static str {
        "spy"
    }
}
