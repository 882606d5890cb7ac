//! 类型系统模块：定义请求描述、响应与可缓存载荷的核心数据类型。
//!
//! # Types Module
//!
//! This module defines the request/response model shared by the interceptor
//! pipeline, the transport and the cache stores.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RequestDescriptor`] | Method, URL, query parameters, headers and body of one logical call |
//! | [`HttpResponse`] | Response as seen by the pipeline, linked to its originating request |
//! | [`CachedPayload`] | Serializable subset of a response that is written to a store |
//!
//! ## Example
//!
//! ```rust
//! use http_response_cache::types::RequestDescriptor;
//!
//! let req = RequestDescriptor::get("https://api.example.com/users")
//!     .with_query("page", "2")
//!     .with_header("accept", "application/json");
//! assert_eq!(req.method, "GET");
//! ```

pub mod request;
pub mod response;

pub use request::RequestDescriptor;
pub use response::{CachedPayload, HttpResponse, HIT_MARKER_HEADER, HIT_MARKER_VALUE};
