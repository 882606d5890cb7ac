//! Interceptor hooks around the transport call.
//!
//! A hook sees every request before it is sent and every response before it
//! reaches the caller. The request hook can short-circuit the call by
//! returning a ready response; the transport is then skipped, but the
//! response still flows through every response hook.

mod cache;

pub use cache::CacheInterceptor;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, Instrument};
use uuid::Uuid;

use crate::transport::Transport;
use crate::types::{HttpResponse, RequestDescriptor};
use crate::{Error, Result};

/// Decision returned by [`Interceptor::on_request`].
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    /// Continue with this (possibly modified) request.
    Forward(RequestDescriptor),
    /// Skip the transport and use this response as the result of the call.
    ShortCircuit(HttpResponse),
}

#[async_trait]
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &str {
        "unnamed"
    }

    async fn on_request(&self, req: RequestDescriptor) -> Result<RequestOutcome> {
        Ok(RequestOutcome::Forward(req))
    }

    async fn on_response(&self, resp: HttpResponse) -> Result<HttpResponse> {
        Ok(resp)
    }

    async fn on_error(&self, _req: &RequestDescriptor, _err: &Error) {}
}

/// Runs hooks in registration order around a transport call.
///
/// Every request hook runs even after an earlier one short-circuited; the
/// first short-circuit response wins. Each `on_response` sees `request` set
/// to the request that same hook forwarded, so changes made by later hooks
/// never leak back into it. Any hook or transport error aborts the call, is
/// reported to every `on_error`, and is returned to the caller.
#[derive(Clone, Default)]
pub struct InterceptorPipeline {
    pub(crate) interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn push(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub async fn execute(
        &self,
        request: RequestDescriptor,
        transport: &dyn Transport,
    ) -> Result<HttpResponse> {
        let span = tracing::debug_span!(
            "http_call",
            call_id = %Uuid::new_v4(),
            method = %request.method,
            url = %request.url,
        );
        self.run(request, transport).instrument(span).await
    }

    async fn run(
        &self,
        mut req: RequestDescriptor,
        transport: &dyn Transport,
    ) -> Result<HttpResponse> {
        let mut short_circuit: Option<HttpResponse> = None;
        // Request as it left each hook, indexed like `interceptors`.
        let mut forwarded = Vec::with_capacity(self.interceptors.len());
        for ic in &self.interceptors {
            match ic.on_request(req.clone()).await {
                Ok(RequestOutcome::Forward(next)) => req = next,
                Ok(RequestOutcome::ShortCircuit(resp)) => {
                    if short_circuit.is_none() {
                        debug!(interceptor = ic.name(), "transport bypassed");
                        short_circuit = Some(resp);
                    }
                }
                Err(err) => return Err(self.fail(&req, err).await),
            }
            forwarded.push(req.clone());
        }

        let mut response = match short_circuit {
            Some(resp) => resp,
            None => match transport.send(&req).await {
                Ok(mut resp) => {
                    // Only responses synthesized from cache may carry the marker.
                    resp.normalize_headers();
                    resp.strip_hit_marker();
                    resp.request.get_or_insert_with(|| req.clone());
                    resp
                }
                Err(err) => return Err(self.fail(&req, err).await),
            },
        };

        for (ic, seen) in self.interceptors.iter().zip(forwarded) {
            response.request = Some(seen);
            response = match ic.on_response(response).await {
                Ok(resp) => resp,
                Err(err) => return Err(self.fail(&req, err).await),
            };
        }
        Ok(response)
    }

    async fn fail(&self, req: &RequestDescriptor, err: Error) -> Error {
        for ic in &self.interceptors {
            ic.on_error(req, &err).await;
        }
        err
    }
}
