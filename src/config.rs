//! Cache configuration.
//!
//! Can be built in code, or loaded from YAML/JSON:
//!
//! ```yaml
//! default_ttl_secs: 300
//! plugin: memory
//! plugin_config:
//!   max_entries: 5000
//! allowed_methods: [GET]
//! ```

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Identifier of the built-in in-memory store plugin.
pub const MEMORY_PLUGIN: &str = "memory";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Time to live of new entries, in seconds. Zero means entries never expire.
    pub default_ttl_secs: u64,
    /// Store plugin id resolved through a [`crate::plugins::PluginRegistry`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
    /// Passed verbatim to the store constructor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_config: Option<serde_json::Value>,
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_prefix: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Serialized payloads larger than this are not stored.
    #[serde(default = "default_max_entry_bytes")]
    pub max_entry_bytes: usize,
}

fn default_allowed_methods() -> Vec<String> {
    vec!["GET".to_string()]
}

fn default_enabled() -> bool {
    true
}

fn default_max_entry_bytes() -> usize {
    10 * 1024 * 1024
}

impl CacheConfig {
    pub fn new(default_ttl_secs: u64) -> Self {
        Self {
            default_ttl_secs,
            plugin: None,
            plugin_config: None,
            allowed_methods: default_allowed_methods(),
            key_prefix: None,
            enabled: default_enabled(),
            max_entry_bytes: default_max_entry_bytes(),
        }
    }

    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }

    pub fn with_plugin_config(mut self, config: serde_json::Value) -> Self {
        self.plugin_config = Some(config);
        self
    }

    pub fn with_allowed_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_max_entry_bytes(mut self, max: usize) -> Self {
        self.max_entry_bytes = max;
        self
    }

    /// Plugin id, defaulting to the in-memory store.
    pub fn plugin_id(&self) -> &str {
        self.plugin.as_deref().unwrap_or(MEMORY_PLUGIN)
    }

    /// TTL applied to new entries: `plugin_config.ttl_secs` if present, else `default_ttl_secs`.
    pub fn ttl(&self) -> Duration {
        let secs = self
            .plugin_config
            .as_ref()
            .and_then(|c| c.get("ttl_secs"))
            .and_then(|v| v.as_u64())
            .unwrap_or(self.default_ttl_secs);
        Duration::from_secs(secs)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(s).map_err(|e| {
            Error::configuration_with_context(
                "failed to parse cache configuration",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("cache_config"),
            )
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let cfg: Self = serde_json::from_value(value).map_err(|e| {
            Error::configuration_with_context(
                "failed to parse cache configuration",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("cache_config"),
            )
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a YAML or JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Apply overrides from the environment:
    /// - `HTTP_CACHE_DEFAULT_TTL_SECS`
    /// - `HTTP_CACHE_PLUGIN`
    /// - `HTTP_CACHE_ENABLED` (`true`/`false`/`1`/`0`)
    ///
    /// Unparseable values are ignored.
    pub fn apply_env_overrides(mut self) -> Self {
        if let Some(ttl) = env::var("HTTP_CACHE_DEFAULT_TTL_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            self.default_ttl_secs = ttl;
        }
        if let Ok(plugin) = env::var("HTTP_CACHE_PLUGIN") {
            if !plugin.trim().is_empty() {
                self.plugin = Some(plugin.trim().to_string());
            }
        }
        if let Some(enabled) = env::var("HTTP_CACHE_ENABLED")
            .ok()
            .and_then(|s| parse_bool(&s))
        {
            self.enabled = enabled;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.allowed_methods.iter().all(|m| m.trim().is_empty()) {
            return Err(Error::configuration_with_context(
                "at least one cacheable method is required",
                ErrorContext::new()
                    .with_field_path("allowed_methods")
                    .with_source("cache_config"),
            ));
        }
        if let Some(ref p) = self.plugin {
            if p.trim().is_empty() {
                return Err(Error::configuration_with_context(
                    "plugin id must not be empty",
                    ErrorContext::new()
                        .with_field_path("plugin")
                        .with_source("cache_config"),
                ));
            }
        }
        if let Some(ttl) = self.plugin_config.as_ref().and_then(|c| c.get("ttl_secs")) {
            if ttl.as_u64().is_none() {
                return Err(Error::configuration_with_context(
                    "ttl_secs must be a non-negative integer",
                    ErrorContext::new()
                        .with_field_path("plugin_config.ttl_secs")
                        .with_details(format!("got {}", ttl))
                        .with_source("cache_config"),
                ));
            }
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
