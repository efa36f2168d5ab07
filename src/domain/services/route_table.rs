//! Route Table Service
//!
//! Cacheability is a property of the route, decided here and consumed
//! by the router - never inside the cache store. Each rule maps a path
//! prefix to a required capability, a cacheable flag, a TTL and the
//! headers that participate in the cache key.

use crate::domain::value_objects::Capability;
use std::time::Duration;

/// Default capability for paths no rule matches.
const DEFAULT_CAPABILITY: &str = "dynamic-api";

/// Routing attributes for a family of paths.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Path prefix this rule applies to
    pub prefix: String,
    /// Capability a target must advertise to serve this route
    pub capability: Capability,
    /// Whether successful responses may be cached
    pub cacheable: bool,
    /// Cache TTL for this route
    pub ttl: Duration,
    /// Request headers that contribute to the cache key
    pub vary_headers: Vec<String>,
}

impl RouteRule {
    pub fn new(prefix: impl Into<String>, capability: Capability) -> Self {
        Self {
            prefix: prefix.into(),
            capability,
            cacheable: false,
            ttl: Duration::from_secs(60),
            vary_headers: Vec::new(),
        }
    }

    pub fn cacheable(mut self, ttl: Duration) -> Self {
        self.cacheable = true;
        self.ttl = ttl;
        self
    }

    pub fn vary_on(mut self, headers: Vec<String>) -> Self {
        self.vary_headers = headers;
        self
    }
}

/// Prefix-matched route rules with a non-cacheable default.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    default_rule: RouteRule,
}

impl RouteTable {
    pub fn new(mut rules: Vec<RouteRule>) -> Self {
        // Longest prefix first so the most specific rule matches.
        rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Self {
            rules,
            default_rule: RouteRule::new("/", Capability::new(DEFAULT_CAPABILITY)),
        }
    }

    /// Resolve the rule for a request path. Unmatched paths get the
    /// non-cacheable default so every request still has a capability to
    /// plan against.
    pub fn resolve(&self, path: &str) -> &RouteRule {
        self.rules
            .iter()
            .find(|r| path.starts_with(r.prefix.as_str()))
            .unwrap_or(&self.default_rule)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
