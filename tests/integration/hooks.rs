//! The cache next to unrelated hooks on the same client.

use crate::mock_server::MockServerFixture;
use async_trait::async_trait;
use http_response_cache::{
    CacheConfig, HttpResponse, Interceptor, RequestDescriptor, RequestOutcome,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Counter {
    requests: AtomicUsize,
    responses: AtomicUsize,
    hits_seen: AtomicUsize,
}

struct CountingHook(Arc<Counter>);

#[async_trait]
impl Interceptor for CountingHook {
    fn name(&self) -> &str {
        "counting"
    }

    async fn on_request(
        &self,
        req: RequestDescriptor,
    ) -> http_response_cache::Result<RequestOutcome> {
        self.0.requests.fetch_add(1, Ordering::SeqCst);
        Ok(RequestOutcome::Forward(req))
    }

    async fn on_response(&self, resp: HttpResponse) -> http_response_cache::Result<HttpResponse> {
        self.0.responses.fetch_add(1, Ordering::SeqCst);
        if resp.is_cache_hit() {
            self.0.hits_seen.fetch_add(1, Ordering::SeqCst);
        }
        Ok(resp)
    }
}

#[tokio::test]
async fn unrelated_hooks_run_once_per_call() {
    for cache_first in [true, false] {
        let mut fixture = MockServerFixture::new().await;
        let mock = fixture.mock_json("GET", "/toto", 200, 1).await;
        let counter = Arc::new(Counter::default());

        let builder = fixture.client_builder();
        let builder = if cache_first {
            builder
                .with_cache(CacheConfig::new(300))
                .interceptor(CountingHook(counter.clone()))
        } else {
            builder
                .interceptor(CountingHook(counter.clone()))
                .with_cache(CacheConfig::new(300))
        };
        let client = builder.build().unwrap();

        client.get("toto").await.unwrap();
        client.get("toto").await.unwrap();

        mock.assert_async().await;
        assert_eq!(counter.requests.load(Ordering::SeqCst), 2, "cache_first={}", cache_first);
        assert_eq!(counter.responses.load(Ordering::SeqCst), 2, "cache_first={}", cache_first);
        assert_eq!(counter.hits_seen.load(Ordering::SeqCst), 1, "cache_first={}", cache_first);
    }
}

#[tokio::test]
async fn request_changes_from_earlier_hooks_shape_the_key() {
    struct Rewrite;

    #[async_trait]
    impl Interceptor for Rewrite {
        async fn on_request(
            &self,
            req: RequestDescriptor,
        ) -> http_response_cache::Result<RequestOutcome> {
            Ok(RequestOutcome::Forward(req.with_query("lang", "fr")))
        }
    }

    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json_with_query("/toto", "lang", "fr", 1).await;
    let client = fixture
        .client_builder()
        .interceptor(Rewrite)
        .with_cache(CacheConfig::new(300))
        .build()
        .unwrap();

    client.get("toto").await.unwrap();
    let hit = client.get("toto").await.unwrap();

    assert!(hit.is_cache_hit());
    assert_eq!(hit.request.unwrap().query, vec![("lang".to_string(), "fr".to_string())]);
    mock.assert_async().await;
}

#[tokio::test]
async fn request_changes_from_later_hooks_do_not_shape_the_key() {
    struct AddToken;

    #[async_trait]
    impl Interceptor for AddToken {
        async fn on_request(
            &self,
            req: RequestDescriptor,
        ) -> http_response_cache::Result<RequestOutcome> {
            Ok(RequestOutcome::Forward(req.with_query("token", "abc")))
        }
    }

    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json_with_query("/toto", "token", "abc", 1).await;
    let client = fixture
        .client_builder()
        .with_cache(CacheConfig::new(300))
        .interceptor(AddToken)
        .build()
        .unwrap();

    let first = client.get("toto").await.unwrap();
    let second = client.get("toto").await.unwrap();

    assert!(!first.is_cache_hit());
    assert!(second.is_cache_hit());
    mock.assert_async().await;

    let cache = &client.caches()[0];
    assert_eq!(cache.store().len().await.unwrap(), 1);
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.sets), (1, 1, 1));
}
