//! 响应缓存模块：缓存键生成、可缓存性校验与可插拔的存储后端。
//!
//! # Response Caching Module
//!
//! Building blocks used by [`crate::interceptors::CacheInterceptor`]:
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheKeyGenerator`] | Deterministic key derivation from a request descriptor |
//! | [`CacheValidator`] | Decides whether a response may be stored |
//! | [`CacheStore`] | Trait for pluggable storage backends (get/set with TTL) |
//! | [`MemoryStore`] | In-memory LRU store with per-entry TTL |
//! | [`CacheStats`] | Hit/miss/store counters |
//!
//! ## Example
//!
//! ```rust
//! use http_response_cache::cache::{CacheKeyGenerator, CacheValidator};
//! use http_response_cache::types::{HttpResponse, RequestDescriptor};
//!
//! let req = RequestDescriptor::get("https://api.example.com/items").with_query("page", "1");
//! let key = CacheKeyGenerator::new().generate(&req);
//! assert!(key.as_str().starts_with("GET:"));
//!
//! let resp = HttpResponse::new(200).with_request(req);
//! assert!(CacheValidator::new().is_cacheable(Some(&resp)));
//! ```

mod key;
mod stats;
mod store;
mod validator;

pub use key::{CacheKey, CacheKeyGenerator};
pub(crate) use stats::AtomicStats;
pub use stats::CacheStats;
pub use store::{CacheStore, MemoryStore, MemoryStoreOptions};
pub use validator::{is_status_cacheable, CacheValidator, CACHEABLE_EXTRA_STATUSES};
