//! Domain Value Objects
//!
//! Immutable values with identity defined by their content.

use std::fmt;

/// A capability tag describing what a target can serve
/// (e.g. "dynamic-api", "static-assets").
///
/// Normalized to lowercase so configuration typos in casing do not
/// split the target set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability(String);

impl Capability {
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(tag.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized signature of a request, used as the cache key.
///
/// Two requests with the same method, path, query parameters (in any
/// order) and relevant header values always produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from the request parts.
    ///
    /// * method is uppercased
    /// * query parameters are sorted so `?a=1&b=2` and `?b=2&a=1` match
    /// * `vary_headers` contributes `name=value` pairs (lowercased names,
    ///   sorted); absent headers contribute nothing
    pub fn from_parts(
        method: &str,
        path: &str,
        query: Option<&str>,
        vary_headers: &[(String, String)],
    ) -> Self {
        let normalized_query = query
            .map(|q| {
                let mut params: Vec<&str> = q.split('&').filter(|p| !p.is_empty()).collect();
                params.sort_unstable();
                params.join("&")
            })
            .unwrap_or_default();

        let mut headers: Vec<String> = vary_headers
            .iter()
            .map(|(name, value)| format!("{}={}", name.to_ascii_lowercase(), value))
            .collect();
        headers.sort_unstable();

        Self(format!(
            "{} {}?{}|{}",
            method.to_ascii_uppercase(),
            path,
            normalized_query,
            headers.join(";")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
