//! Cache key generation.

use crate::types::RequestDescriptor;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const SEPARATOR: char = ':';

/// Opaque, deterministic fingerprint of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub hash: String,
}

impl CacheKey {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Derives cache keys from request descriptors.
///
/// Layout: `[prefix:]METHOD:h(url):h(query):h(body)` where each `h` is an
/// independent SHA-256 hex digest. Hashing each segment separately keeps the
/// boundary between URL, query and body unambiguous.
///
/// Query parameters are sorted by name, then value, before hashing, so their
/// insertion order never changes the key. Bodies are compact JSON with object
/// keys sorted at every depth, whatever map ordering `serde_json` was built
/// with. An absent body hashes the empty string.
#[derive(Debug, Clone, Default)]
pub struct CacheKeyGenerator {
    prefix: Option<String>,
}

impl CacheKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace keys, e.g. when several caches share one external store.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn generate(&self, request: &RequestDescriptor) -> CacheKey {
        let mut key = String::with_capacity(256);
        if let Some(ref p) = self.prefix {
            key.push_str(p);
            key.push(SEPARATOR);
        }
        key.push_str(&request.method);
        key.push(SEPARATOR);
        key.push_str(&digest(&request.url));
        key.push(SEPARATOR);
        key.push_str(&digest(&canonical_query(&request.query)));
        key.push(SEPARATOR);
        key.push_str(&digest(&canonical_body(request.body.as_ref())));
        CacheKey::new(key)
    }
}

fn digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn canonical_query(query: &[(String, String)]) -> String {
    if query.is_empty() {
        return String::new();
    }
    let mut pairs: Vec<&(String, String)> = query.iter().collect();
    pairs.sort();
    serde_json::to_string(&pairs).unwrap_or_default()
}

fn canonical_body(body: Option<&serde_json::Value>) -> String {
    let mut out = String::new();
    if let Some(v) = body {
        write_sorted(v, &mut out);
    }
    out
}

fn write_sorted(value: &serde_json::Value, out: &mut String) {
    use serde_json::Value;
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (k, v)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(k).unwrap_or_default());
                out.push(':');
                write_sorted(v, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, v) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_sorted(v, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar).unwrap_or_default()),
    }
}
