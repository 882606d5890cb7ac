use super::Transport;
use crate::types::{HttpResponse, RequestDescriptor};
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::redirect::Policy;
use reqwest::Proxy;
use std::collections::BTreeMap;
use std::env;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub proxy_url: Option<String>,
    /// When false, 3xx responses are returned as-is (and may be cached).
    pub follow_redirects: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            proxy_url: None,
            follow_redirects: true,
        }
    }
}

impl TransportConfig {
    /// Defaults overridden by `HTTP_CACHE_TIMEOUT_SECS`, `HTTP_CACHE_POOL_MAX_IDLE_PER_HOST`,
    /// `HTTP_CACHE_POOL_IDLE_TIMEOUT_SECS` and `HTTP_CACHE_PROXY_URL`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout: env_parse::<u64>("HTTP_CACHE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            pool_max_idle_per_host: env_parse::<usize>("HTTP_CACHE_POOL_MAX_IDLE_PER_HOST")
                .unwrap_or(defaults.pool_max_idle_per_host),
            pool_idle_timeout: env_parse::<u64>("HTTP_CACHE_POOL_IDLE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.pool_idle_timeout),
            proxy_url: env::var("HTTP_CACHE_PROXY_URL").ok(),
            follow_redirects: defaults.follow_redirects,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

/// reqwest-backed transport.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(config.pool_idle_timeout));

        if !config.follow_redirects {
            builder = builder.redirect(Policy::none());
        }

        if let Some(ref proxy_url) = config.proxy_url {
            let proxy = Proxy::all(proxy_url)
                .map_err(|e| TransportError::Other(format!("invalid proxy url: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(&TransportConfig::from_env())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<HttpResponse> {
        let url = Url::parse(&request.url).map_err(|e| TransportError::InvalidUrl {
            url: request.url.clone(),
            source: e,
        })?;
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(request.method.clone()))?;

        let mut req = self.client.request(method, url);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        for (k, v) in &request.headers {
            req = req.header(k.as_str(), v.as_str());
        }
        if let Some(ref body) = request.body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(TransportError::Http)?;
        let status = resp.status();
        let headers = collect_headers(resp.headers());
        let bytes = resp.bytes().await.map_err(TransportError::Http)?;

        let mut out = HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().map(str::to_string),
            headers,
            body: decode_body(&bytes),
            request: Some(request.clone()),
        };
        // The hit marker is reserved for responses synthesized from cache.
        out.strip_hit_marker();
        Ok(out)
    }
}

fn collect_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        out.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    out
}

/// JSON bodies are parsed; anything else is kept as text. Empty bodies become `null`.
fn decode_body(bytes: &Bytes) -> serde_json::Value {
    if bytes.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("Transport error: {0}")]
    Other(String),
}
