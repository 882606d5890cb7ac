//! Response model and the cacheable payload derived from it.

use super::request::RequestDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserved header attached to responses synthesized from cache.
pub const HIT_MARKER_HEADER: &str = "x-cache-hit";
/// Sentinel value of [`HIT_MARKER_HEADER`].
pub const HIT_MARKER_VALUE: &str = "true";

/// Response flowing back through the interceptor pipeline.
///
/// `request` links the response to the call that produced it. The pipeline
/// fills it in before each response hook; a response without it is never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: serde_json::Value,
    pub request: Option<RequestDescriptor>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            status_text: None,
            headers: BTreeMap::new(),
            body: serde_json::Value::Null,
            request: None,
        }
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = body;
        self
    }

    pub fn with_request(mut self, request: RequestDescriptor) -> Self {
        self.request = Some(request);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// True if this response was synthesized from a cache entry.
    pub fn is_cache_hit(&self) -> bool {
        self.header(HIT_MARKER_HEADER) == Some(HIT_MARKER_VALUE)
    }

    /// Remove the reserved marker, e.g. from a network response that happens to carry it.
    pub fn strip_hit_marker(&mut self) {
        self.headers
            .retain(|name, _| !name.eq_ignore_ascii_case(HIT_MARKER_HEADER));
    }

    /// Lowercase every header name. Values of names that collide are joined with `", "`.
    pub fn normalize_headers(&mut self) {
        if self.headers.keys().all(|k| !k.bytes().any(|b| b.is_ascii_uppercase())) {
            return;
        }
        let mut out: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in std::mem::take(&mut self.headers) {
            out.entry(name.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        self.headers = out;
    }
}

/// Cacheable subset of a response.
///
/// Only serializable content is kept: the originating request and any
/// transport state are dropped, and so is the hit marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPayload {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: serde_json::Value,
}

impl CachedPayload {
    pub fn from_response(response: &HttpResponse) -> Self {
        let mut headers = response.headers.clone();
        headers.retain(|name, _| !name.eq_ignore_ascii_case(HIT_MARKER_HEADER));
        Self {
            status: response.status,
            status_text: response.status_text.clone(),
            headers,
            body: response.body.clone(),
        }
    }

    /// Build the synthetic response served on a cache hit, tagged with the hit marker.
    pub fn into_hit_response(self, request: RequestDescriptor) -> HttpResponse {
        let mut headers = self.headers;
        headers.insert(HIT_MARKER_HEADER.to_string(), HIT_MARKER_VALUE.to_string());
        HttpResponse {
            status: self.status,
            status_text: self.status_text,
            headers,
            body: self.body,
            request: Some(request),
        }
    }
}
