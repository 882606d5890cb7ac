//! # http-response-cache
//!
//! 透明的 HTTP 响应缓存层：在请求发出前查询缓存，命中时直接返回缓存响应。
//!
//! Transparent response caching for async HTTP clients. A cache interceptor
//! sits in the client's request/response pipeline: before a request is sent
//! it looks up an equivalent earlier response and, on a hit, short-circuits
//! the network call; after a real response arrives it stores it if it is
//! safe to reuse.
//!
//! ## What gets cached
//!
//! - Only `GET` requests by default (configurable via `allowed_methods`)
//! - Only `2xx` responses plus `301`, `302`, `307`, `308` and `410`
//! - Entries live for a fixed TTL from the moment they are written; hits never
//!   extend it
//!
//! This is not an RFC 7234 cache: `Cache-Control`, `ETag` and `Vary` are ignored.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use http_response_cache::{CacheConfig, CachedClient};
//!
//! #[tokio::main]
//! async fn main() -> http_response_cache::Result<()> {
//!     let client = CachedClient::builder()
//!         .base_url("http://localhost:3000")
//!         .with_cache(CacheConfig::new(300))
//!         .build()?;
//!
//!     let first = client.get("toto").await?;
//!     let second = client.get("toto").await?; // served from cache
//!     assert!(second.is_cache_hit());
//!     assert_eq!(first.body, second.body);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Request descriptor, response and cached payload types |
//! | [`cache`] | Key derivation, cacheability rules, stores and stats |
//! | [`config`] | Cache configuration loading and validation |
//! | [`interceptors`] | Hook trait, pipeline and the cache interceptor |
//! | [`plugins`] | Registry mapping plugin ids to store constructors |
//! | [`transport`] | Transport trait and the reqwest implementation |
//! | [`client`] | Client builder that wires everything together |

pub mod cache;
pub mod client;
pub mod config;
pub mod interceptors;
pub mod plugins;
pub mod transport;
pub mod types;

pub use cache::{CacheKey, CacheKeyGenerator, CacheStats, CacheStore, CacheValidator, MemoryStore};
pub use client::{CachedClient, CachedClientBuilder};
pub use config::CacheConfig;
pub use interceptors::{CacheInterceptor, Interceptor, InterceptorPipeline, RequestOutcome};
pub use plugins::PluginRegistry;
pub use transport::{HttpTransport, Transport};
pub use types::{CachedPayload, HttpResponse, RequestDescriptor, HIT_MARKER_HEADER};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
