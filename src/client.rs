//! HTTP client with the interceptor pipeline wired in.
//!
//! Keep the public surface small: build with [`CachedClientBuilder`], call
//! through [`CachedClient`]. Implementation details live under `src/client/`.

pub mod builder;
pub mod core;

pub use builder::CachedClientBuilder;
pub use core::CachedClient;
