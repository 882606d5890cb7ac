//! End-to-end caching behavior through the reqwest transport.

use crate::mock_server::{spy_registry, MockServerFixture, SpyStore};
use async_trait::async_trait;
use http_response_cache::transport::TransportConfig;
use http_response_cache::{
    CacheConfig, CacheKey, CacheStore, CachedClient, Error, ErrorContext, PluginRegistry,
    RequestDescriptor, HIT_MARKER_HEADER,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn repeated_get_reaches_server_once() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/toto", 200, 1).await;
    let client = fixture.cached_client(CacheConfig::new(300));

    let first = client.get("toto").await.unwrap();
    let second = client.get("toto").await.unwrap();

    mock.assert_async().await;
    assert_eq!(first.body, json!({"a": 1}));
    assert_eq!(first.body, second.body);
    assert_eq!(first.status, second.status);
    assert_eq!(first.status_text, second.status_text);
    assert!(!first.is_cache_hit());
    assert_eq!(second.header(HIT_MARKER_HEADER), Some("true"));
}

#[tokio::test]
async fn server_sent_marker_is_not_a_hit() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/marked")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("X-Cache-Hit", "true")
        .with_body(r#"{"a":1}"#)
        .expect(1)
        .create_async()
        .await;
    let client = fixture.cached_client(CacheConfig::new(300));

    let first = client.get("marked").await.unwrap();
    assert!(!first.is_cache_hit());
    assert_eq!(first.header(HIT_MARKER_HEADER), None);

    let second = client.get("marked").await.unwrap();
    assert!(second.is_cache_hit());
    assert_eq!(client.cache_stats().unwrap().sets, 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn different_paths_are_different_keys() {
    let mut fixture = MockServerFixture::new().await;
    let toto = fixture.mock_json("GET", "/toto", 200, 1).await;
    let toto2 = fixture.mock_json("GET", "/toto2", 200, 1).await;
    let client = fixture.cached_client(CacheConfig::new(300));

    client.get("toto").await.unwrap();
    client.get("toto2").await.unwrap();

    toto.assert_async().await;
    toto2.assert_async().await;
}

#[tokio::test]
async fn query_values_are_part_of_the_key() {
    let mut fixture = MockServerFixture::new().await;
    let one = fixture.mock_json_with_query("/item", "id", "1", 1).await;
    let two = fixture.mock_json_with_query("/item", "id", "2", 1).await;
    let client = fixture.cached_client(CacheConfig::new(300));

    let a = client.get_with_query("item", &[("id", "1")]).await.unwrap();
    let b = client.get_with_query("item", &[("id", "2")]).await.unwrap();
    let a_again = client.get_with_query("item", &[("id", "1")]).await.unwrap();

    one.assert_async().await;
    two.assert_async().await;
    assert_eq!(a.body, json!({"id": "1"}));
    assert_eq!(b.body, json!({"id": "2"}));
    assert!(a_again.is_cache_hit());
}

#[tokio::test]
async fn non_get_methods_always_reach_the_server() {
    let mut fixture = MockServerFixture::new().await;
    let spy = Arc::new(SpyStore::default());
    let client = fixture
        .client_builder()
        .registry(spy_registry(&spy))
        .with_cache(CacheConfig::new(300).with_plugin("spy"))
        .build()
        .unwrap();

    for method in ["POST", "PUT", "PATCH", "DELETE", "HEAD"] {
        let mock = fixture.mock_json(method, "/toto", 200, 2).await;
        for _ in 0..2 {
            let req = RequestDescriptor::new(method, "toto").with_body(json!({"same": true}));
            let resp = client.execute(req).await.unwrap();
            assert!(!resp.is_cache_hit(), "{} served from cache", method);
        }
        mock.assert_async().await;
    }
    assert_eq!(spy.sets(), 0);
}

#[tokio::test]
async fn entries_expire_after_ttl() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/toto", 200, 2).await;
    let client = fixture.cached_client(CacheConfig::new(1));

    client.get("toto").await.unwrap();
    assert!(client.get("toto").await.unwrap().is_cache_hit());

    tokio::time::sleep(Duration::from_millis(1100)).await;
    let after = client.get("toto").await.unwrap();

    assert!(!after.is_cache_hit());
    mock.assert_async().await;
}

#[tokio::test]
async fn hits_do_not_write_to_the_store() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/toto", 200, 1).await;
    let spy = Arc::new(SpyStore::default());
    let client = fixture
        .client_builder()
        .registry(spy_registry(&spy))
        .with_cache(CacheConfig::new(300).with_plugin("spy"))
        .build()
        .unwrap();

    client.get("toto").await.unwrap();
    assert_eq!(spy.sets(), 1);

    let hit = client.get("toto").await.unwrap();
    assert!(hit.is_cache_hit());
    assert_eq!(spy.sets(), 1);
    assert_eq!(spy.gets(), 2);
    mock.assert_async().await;
}

#[tokio::test]
async fn status_codes_decide_cacheability() {
    let mut fixture = MockServerFixture::new().await;
    let client = fixture
        .client_builder()
        .transport_config(TransportConfig::default().with_follow_redirects(false))
        .with_cache(CacheConfig::new(300))
        .build()
        .unwrap();

    let cases = [
        (200, 1),
        (201, 1),
        (301, 1),
        (302, 1),
        (307, 1),
        (308, 1),
        (410, 1),
        (303, 2),
        (404, 2),
        (500, 2),
    ];
    for (status, expected_calls) in cases {
        let path = format!("/status/{}", status);
        let mock = fixture.mock_json("GET", &path, status, expected_calls).await;
        let first = client.get(&path).await.unwrap();
        let second = client.get(&path).await.unwrap();
        assert_eq!(first.status as usize, status);
        assert_eq!(second.status as usize, status);
        assert_eq!(second.is_cache_hit(), expected_calls == 1, "status {}", status);
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn concurrent_misses_end_with_one_entry() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/shared")
        .with_status(200)
        .with_body("hello")
        .expect_at_least(1)
        .create_async()
        .await;
    let client = Arc::new(fixture.cached_client(CacheConfig::new(300)));

    let calls = (0..8).map(|_| {
        let client = client.clone();
        async move { client.get("shared").await }
    });
    let results = futures::future::join_all(calls).await;

    for r in results {
        assert_eq!(r.unwrap().body, json!("hello"));
    }
    assert_eq!(client.caches()[0].store().len().await.unwrap(), 1);
    assert!(client.get("shared").await.unwrap().is_cache_hit());
    mock.assert_async().await;
}

struct DownStore;

#[async_trait]
impl CacheStore for DownStore {
    async fn get(&self, _: &CacheKey) -> http_response_cache::Result<Option<Vec<u8>>> {
        Err(Error::store_with_context(
            "connection refused",
            ErrorContext::new().with_source("down_store"),
        ))
    }
    async fn set(&self, _: &CacheKey, _: &[u8], _: Duration) -> http_response_cache::Result<()> {
        Ok(())
    }
    async fn delete(&self, _: &CacheKey) -> http_response_cache::Result<bool> {
        Ok(false)
    }
    async fn clear(&self) -> http_response_cache::Result<()> {
        Ok(())
    }
    async fn len(&self) -> http_response_cache::Result<usize> {
        Ok(0)
    }
    fn name(&self) -> &'static str {
        "down"
    }
}

#[tokio::test]
async fn store_outage_fails_the_call() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/toto", 200, 0).await;
    let registry = PluginRegistry::new().with_plugin("down", |_cfg: &CacheConfig| {
        Ok(Arc::new(DownStore) as Arc<dyn CacheStore>)
    });
    let client: CachedClient = fixture
        .client_builder()
        .registry(registry)
        .with_cache(CacheConfig::new(300).with_plugin("down"))
        .build()
        .unwrap();

    let err = client.get("toto").await.unwrap_err();
    assert!(err.is_store_access(), "unexpected error: {}", err);
    mock.assert_async().await;
}
