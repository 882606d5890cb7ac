//! Cache store implementations.

use super::key::CacheKey;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use lru::LruCache;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Storage capability behind the cache interceptor.
///
/// Values are opaque bytes and TTLs are whole seconds. A store owns its
/// eviction policy; callers never inspect entries beyond these operations.
/// Implementations must tolerate concurrent calls; last write wins.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &CacheKey) -> Result<bool>;
    async fn clear(&self) -> Result<()>;
    async fn len(&self) -> Result<usize>;
    fn name(&self) -> &'static str;
}

struct CacheEntry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    /// A zero TTL, or one past the clock's range, never expires.
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(ttl)
        };
        Self { data, expires_at }
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|at| Instant::now() >= at)
            .unwrap_or(false)
    }
}

/// Options for [`MemoryStore`], read from `plugin_config`.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryStoreOptions {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

fn default_max_entries() -> usize {
    10_000
}

impl Default for MemoryStoreOptions {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

impl MemoryStoreOptions {
    /// Unknown fields are ignored so the same object can carry options for the core.
    pub fn from_plugin_config(config: Option<&serde_json::Value>) -> Result<Self> {
        let opts: Self = match config {
            None | Some(serde_json::Value::Null) => Self::default(),
            Some(v) => serde_json::from_value(v.clone()).map_err(|e| {
                Error::configuration_with_context(
                    "invalid memory store options",
                    ErrorContext::new()
                        .with_field_path("plugin_config")
                        .with_details(e.to_string())
                        .with_source("memory_store"),
                )
            })?,
        };
        if opts.max_entries == 0 {
            return Err(Error::configuration_with_context(
                "max_entries must be greater than zero",
                ErrorContext::new()
                    .with_field_path("plugin_config.max_entries")
                    .with_source("memory_store"),
            ));
        }
        Ok(opts)
    }
}

/// In-process store with per-entry TTL and an LRU capacity bound.
///
/// Expired entries are dropped lazily on read, and swept before an insert
/// into a full store so live entries are not evicted in their place.
pub struct MemoryStore {
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl MemoryStore {
    pub fn new(max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn with_options(opts: &MemoryStoreOptions) -> Self {
        Self::new(opts.max_entries)
    }

    fn lock(&self) -> Result<MutexGuard<'_, LruCache<String, CacheEntry>>> {
        self.entries.lock().map_err(|_| {
            Error::store_with_context(
                "memory store lock poisoned",
                ErrorContext::new().with_source("memory_store"),
            )
        })
    }

    fn sweep_expired(entries: &mut LruCache<String, CacheEntry>) {
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, e)| e.is_expired())
            .map(|(k, _)| k.clone())
            .collect();
        for k in expired {
            entries.pop(&k);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(default_max_entries())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let mut entries = self.lock()?;
        match entries.get(key.as_str()) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.data.clone())),
            Some(_) => {}
            None => return Ok(None),
        }
        entries.pop(key.as_str());
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: &[u8], ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(value.to_vec(), ttl);
        let mut entries = self.lock()?;
        if entries.len() >= entries.cap().get() && !entries.contains(key.as_str()) {
            Self::sweep_expired(&mut entries);
        }
        entries.put(key.hash.clone(), entry);
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.lock()?.pop(key.as_str()).is_some())
    }

    async fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.lock()?.iter().filter(|(_, e)| !e.is_expired()).count())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
