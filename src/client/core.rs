use crate::cache::CacheStats;
use crate::interceptors::{CacheInterceptor, InterceptorPipeline};
use crate::transport::Transport;
use crate::types::{HttpResponse, RequestDescriptor};
use crate::Result;
use std::sync::Arc;

/// HTTP client whose calls run through an interceptor pipeline.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct CachedClient {
    pub(crate) base_url: Option<String>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) pipeline: InterceptorPipeline,
    pub(crate) caches: Vec<Arc<CacheInterceptor>>,
}

impl CachedClient {
    pub fn builder() -> crate::client::CachedClientBuilder {
        crate::client::CachedClientBuilder::new()
    }

    pub async fn execute(&self, mut request: RequestDescriptor) -> Result<HttpResponse> {
        request.url = self.resolve_url(&request.url);
        self.pipeline.execute(request, self.transport.as_ref()).await
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.execute(RequestDescriptor::get(url)).await
    }

    pub async fn get_with_query(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse> {
        self.execute(RequestDescriptor::get(url).with_query_pairs(query.iter().copied()))
            .await
    }

    pub async fn post(&self, url: &str, body: serde_json::Value) -> Result<HttpResponse> {
        self.execute(RequestDescriptor::post(url).with_body(body))
            .await
    }

    /// Stats of the first installed cache, if any.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.caches.first().map(|c| c.stats())
    }

    pub fn caches(&self) -> &[Arc<CacheInterceptor>] {
        &self.caches
    }

    /// Absolute URLs pass through; relative ones are joined onto the base URL.
    fn resolve_url(&self, url: &str) -> String {
        if url::Url::parse(url).is_ok() {
            return url.to_string();
        }
        match self.base_url.as_deref() {
            Some(base) if url.is_empty() => base.to_string(),
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                url.trim_start_matches('/')
            ),
            None => url.to_string(),
        }
    }
}
