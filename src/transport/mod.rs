//! 传输层模块：对外发起真实的 HTTP 调用。
//!
//! The cache never talks to the network itself; it only decides whether the
//! [`Transport`] needs to run for a given call.

mod http;

pub use http::{HttpTransport, TransportConfig, TransportError};

use crate::types::{HttpResponse, RequestDescriptor};
use crate::Result;
use async_trait::async_trait;

/// Executes a request against the network (or anything that stands in for it).
///
/// Header names may use any case; the pipeline lowercases them and drops a
/// hit marker sent by the server before any hook sees the response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse>;
}
