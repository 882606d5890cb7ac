use crate::client::core::CachedClient;
use crate::config::CacheConfig;
use crate::interceptors::{CacheInterceptor, Interceptor, InterceptorPipeline};
use crate::plugins::PluginRegistry;
use crate::transport::{HttpTransport, Transport, TransportConfig};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

enum PendingHook {
    Ready(Arc<dyn Interceptor>),
    Cache(CacheConfig),
}

/// Builder for [`CachedClient`].
///
/// Hooks run in the order they are added, the cache included.
pub struct CachedClientBuilder {
    base_url: Option<String>,
    transport_config: TransportConfig,
    transport: Option<Arc<dyn Transport>>,
    registry: Option<PluginRegistry>,
    hooks: Vec<PendingHook>,
}

impl CachedClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            transport_config: TransportConfig::from_env(),
            transport: None,
            registry: None,
            hooks: Vec::new(),
        }
    }

    /// Base URL that relative request URLs are resolved against.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Request timeout of the default HTTP transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport_config.timeout = timeout;
        self
    }

    /// Replace the default transport settings.
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = config;
        self
    }

    /// Use a custom transport instead of the default reqwest one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Registry used to resolve the store plugin of `with_cache`.
    /// Defaults to [`PluginRegistry::new`].
    pub fn registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.hooks.push(PendingHook::Ready(Arc::new(interceptor)));
        self
    }

    pub fn interceptor_arc(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.hooks.push(PendingHook::Ready(interceptor));
        self
    }

    /// Install response caching with the given configuration.
    pub fn with_cache(mut self, config: CacheConfig) -> Self {
        self.hooks.push(PendingHook::Cache(config));
        self
    }

    pub fn build(self) -> Result<CachedClient> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(&self.transport_config)?),
        };
        let registry = self.registry.unwrap_or_default();

        let mut pipeline = InterceptorPipeline::new();
        let mut caches: Vec<Arc<CacheInterceptor>> = Vec::new();
        for hook in self.hooks {
            match hook {
                PendingHook::Ready(ic) => pipeline.push(ic),
                PendingHook::Cache(cfg) => {
                    let cache = Arc::new(registry.build_interceptor(&cfg)?);
                    pipeline.push(cache.clone());
                    caches.push(cache);
                }
            }
        }

        info!(
            base_url = self.base_url.as_deref().unwrap_or(""),
            interceptors = pipeline.len(),
            caches = caches.len(),
            "cached client ready"
        );

        Ok(CachedClient {
            base_url: self.base_url,
            transport,
            pipeline,
            caches,
        })
    }
}

impl Default for CachedClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
