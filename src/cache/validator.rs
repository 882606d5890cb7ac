//! Cacheability rules for responses.

use crate::types::HttpResponse;

/// Non-2xx statuses that may still be cached (redirects and `410 Gone`).
pub const CACHEABLE_EXTRA_STATUSES: [u16; 5] = [301, 302, 307, 308, 410];

/// Decides whether a response may be written to the cache.
///
/// All of these must hold:
/// - a response exists and knows its originating request
/// - the request method is in the allowed list (default: `GET` only)
/// - the status is 2xx or one of [`CACHEABLE_EXTRA_STATUSES`]
#[derive(Debug, Clone)]
pub struct CacheValidator {
    allowed_methods: Vec<String>,
}

impl Default for CacheValidator {
    fn default() -> Self {
        Self {
            allowed_methods: vec!["GET".to_string()],
        }
    }
}

impl CacheValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allowed_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_methods = methods
            .into_iter()
            .map(|m| m.as_ref().trim().to_uppercase())
            .collect();
        self
    }

    pub fn allowed_methods(&self) -> &[String] {
        &self.allowed_methods
    }

    pub fn is_method_allowed(&self, method: &str) -> bool {
        self.allowed_methods.iter().any(|m| m == method)
    }

    pub fn is_cacheable(&self, response: Option<&HttpResponse>) -> bool {
        let Some(response) = response else {
            return false;
        };
        // Orphaned responses are never cached.
        let Some(request) = response.request.as_ref() else {
            return false;
        };
        self.is_method_allowed(&request.method) && is_status_cacheable(response.status)
    }
}

pub fn is_status_cacheable(status: u16) -> bool {
    (200..300).contains(&status) || CACHEABLE_EXTRA_STATUSES.contains(&status)
}
