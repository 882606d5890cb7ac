//! Response caching interceptor.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

use super::{Interceptor, RequestOutcome};
use crate::cache::{
    AtomicStats, CacheKey, CacheKeyGenerator, CacheStats, CacheStore, CacheValidator,
};
use crate::config::CacheConfig;
use crate::types::{CachedPayload, HttpResponse, RequestDescriptor};
use crate::{Error, ErrorContext, Result};

/// Serves repeated requests from a [`CacheStore`] and stores eligible responses.
///
/// Request phase: derive the key, look it up, and on a hit short-circuit the
/// call with the cached payload tagged with the hit marker. Response phase:
/// responses carrying the hit marker are returned untouched, everything else
/// is validated and, if cacheable, written with the configured TTL.
///
/// Store failures are returned as errors; there is no silent fallback to an
/// uncached call. One instance can serve any number of concurrent calls.
pub struct CacheInterceptor {
    store: Arc<dyn CacheStore>,
    keygen: CacheKeyGenerator,
    validator: CacheValidator,
    ttl: Duration,
    enabled: bool,
    max_entry_bytes: usize,
    stats: AtomicStats,
}

impl CacheInterceptor {
    pub fn new(store: Arc<dyn CacheStore>, config: &CacheConfig) -> Self {
        let mut keygen = CacheKeyGenerator::new();
        if let Some(ref prefix) = config.key_prefix {
            keygen = keygen.with_prefix(prefix.clone());
        }
        Self {
            store,
            keygen,
            validator: CacheValidator::new().with_allowed_methods(&config.allowed_methods),
            ttl: config.ttl(),
            enabled: config.enabled,
            max_entry_bytes: config.max_entry_bytes,
            stats: AtomicStats::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn key_for(&self, request: &RequestDescriptor) -> CacheKey {
        self.keygen.generate(request)
    }

    /// Look up the cached payload for a request.
    pub async fn lookup(&self, request: &RequestDescriptor) -> Result<Option<CachedPayload>> {
        let key = self.key_for(request);
        trace!(key = %key, "cache lookup");
        let bytes = match self.store.get(&key).await {
            Ok(b) => b,
            Err(e) => {
                AtomicStats::bump(&self.stats.errors);
                return Err(e);
            }
        };
        let Some(bytes) = bytes else {
            return Ok(None);
        };
        match serde_json::from_slice::<CachedPayload>(&bytes) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) => {
                AtomicStats::bump(&self.stats.errors);
                Err(Error::store_with_context(
                    "cached entry could not be decoded",
                    ErrorContext::new()
                        .with_field_path(key.hash)
                        .with_details(e.to_string())
                        .with_source(self.store.name()),
                ))
            }
        }
    }

    /// Write a response if it is cacheable. Returns whether it was stored.
    pub async fn store_response(&self, response: &HttpResponse) -> Result<bool> {
        if !self.validator.is_cacheable(Some(response)) {
            AtomicStats::bump(&self.stats.skipped);
            return Ok(false);
        }
        let Some(ref request) = response.request else {
            return Ok(false);
        };
        let key = self.key_for(request);
        let data = serde_json::to_vec(&CachedPayload::from_response(response))?;
        if data.len() > self.max_entry_bytes {
            warn!(
                key = %key,
                size = data.len(),
                limit = self.max_entry_bytes,
                "response too large to cache"
            );
            AtomicStats::bump(&self.stats.skipped);
            return Ok(false);
        }
        if let Err(e) = self.store.set(&key, &data, self.ttl).await {
            AtomicStats::bump(&self.stats.errors);
            return Err(e);
        }
        AtomicStats::bump(&self.stats.sets);
        debug!(
            key = %key,
            status = response.status,
            ttl_secs = self.ttl.as_secs(),
            "response cached"
        );
        Ok(true)
    }
}

#[async_trait]
impl Interceptor for CacheInterceptor {
    fn name(&self) -> &str {
        "cache"
    }

    async fn on_request(&self, req: RequestDescriptor) -> Result<RequestOutcome> {
        if !self.enabled || !self.validator.is_method_allowed(&req.method) {
            return Ok(RequestOutcome::Forward(req));
        }
        match self.lookup(&req).await? {
            Some(payload) => {
                AtomicStats::bump(&self.stats.hits);
                debug!(store = self.store.name(), "cache hit");
                Ok(RequestOutcome::ShortCircuit(payload.into_hit_response(req)))
            }
            None => {
                AtomicStats::bump(&self.stats.misses);
                debug!(store = self.store.name(), "cache miss");
                Ok(RequestOutcome::Forward(req))
            }
        }
    }

    async fn on_response(&self, resp: HttpResponse) -> Result<HttpResponse> {
        // Re-storing a hit would restart its TTL.
        if resp.is_cache_hit() {
            return Ok(resp);
        }
        if !self.enabled {
            AtomicStats::bump(&self.stats.skipped);
            return Ok(resp);
        }
        self.store_response(&resp).await?;
        Ok(resp)
    }
}
