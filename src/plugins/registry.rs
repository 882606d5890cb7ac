//! Plugin registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{CacheStore, MemoryStore, MemoryStoreOptions};
use crate::config::{CacheConfig, MEMORY_PLUGIN};
use crate::interceptors::CacheInterceptor;
use crate::{Error, ErrorContext, Result};

/// Constructor for a store, given the full cache configuration.
pub type StoreFactory = Arc<dyn Fn(&CacheConfig) -> Result<Arc<dyn CacheStore>> + Send + Sync>;

#[derive(Clone)]
pub struct PluginRegistry {
    factories: HashMap<String, StoreFactory>,
}

impl PluginRegistry {
    /// An empty registry with no plugins.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with the built-in `memory` plugin.
    pub fn new() -> Self {
        Self::empty().with_plugin(MEMORY_PLUGIN, |cfg: &CacheConfig| {
            let opts = MemoryStoreOptions::from_plugin_config(cfg.plugin_config.as_ref())?;
            Ok(Arc::new(MemoryStore::with_options(&opts)) as Arc<dyn CacheStore>)
        })
    }

    pub fn with_plugin<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&CacheConfig) -> Result<Arc<dyn CacheStore>> + Send + Sync + 'static,
    {
        self.register(id, factory);
        self
    }

    /// Register (or replace) a plugin.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(&CacheConfig) -> Result<Arc<dyn CacheStore>> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Arc::new(factory));
    }

    pub fn has(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.factories.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn create_store(&self, config: &CacheConfig) -> Result<Arc<dyn CacheStore>> {
        let id = config.plugin_id();
        let factory = self.factories.get(id).ok_or_else(|| {
            Error::configuration_with_context(
                format!("unknown cache plugin '{}'", id),
                ErrorContext::new()
                    .with_field_path("plugin")
                    .with_details(format!("registered: {}", self.ids().join(", ")))
                    .with_source("plugin_registry"),
            )
        })?;
        factory(config)
    }

    /// Validate the configuration and build an interceptor bound to the selected store.
    pub fn build_interceptor(&self, config: &CacheConfig) -> Result<CacheInterceptor> {
        config.validate()?;
        let store = self.create_store(config)?;
        tracing::debug!(
            plugin = config.plugin_id(),
            store = store.name(),
            ttl_secs = config.ttl().as_secs(),
            "cache interceptor created"
        );
        Ok(CacheInterceptor::new(store, config))
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
