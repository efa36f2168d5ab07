//! Degradation Generator Service
//!
//! The true last resort: pre-baked static payloads served when no live
//! target and no cached entry can answer a request. Payloads are
//! rendered to bytes at construction so request-time lookup cannot
//! fail; a bad catalog is a configuration bug caught by `validate()`
//! at startup.

use crate::domain::entities::ResponsePayload;
use bytes::Bytes;
use thiserror::Error;

/// Catalog version stamped into every degraded payload.
const CATALOG_VERSION: &str = "1";

/// A misconfigured degradation catalog. Fails process start, never a
/// request.
#[derive(Debug, Error)]
pub enum DegradationError {
    #[error("degraded route prefix {0:?} must start with '/'")]
    BadPrefix(String),
    #[error("degraded route {0:?} has invalid status code {1}")]
    BadStatus(String, u16),
    #[error("degraded route {0:?} body is not a JSON object")]
    BadBody(String),
}

/// One pre-baked degraded response, matched by path prefix.
#[derive(Debug, Clone)]
struct DegradedRoute {
    prefix: String,
    payload: ResponsePayload,
}

/// Route-pattern keyed catalog of degraded responses.
///
/// Pure and stateless after construction: `response_for` is a prefix
/// match over immutable pre-rendered payloads, plus a built-in default
/// that always exists.
#[derive(Debug, Clone)]
pub struct DegradationCatalog {
    routes: Vec<DegradedRoute>,
    default_payload: ResponsePayload,
}

impl DegradationCatalog {
    /// Build a catalog from `(prefix, status, body)` rules.
    ///
    /// Longer prefixes win over shorter ones. Bodies are annotated with
    /// `source: degraded` and the catalog version, then rendered once.
    pub fn new(rules: Vec<(String, u16, serde_json::Value)>) -> Result<Self, DegradationError> {
        let mut routes = Vec::with_capacity(rules.len());

        for (prefix, status, body) in rules {
            if !prefix.starts_with('/') {
                return Err(DegradationError::BadPrefix(prefix));
            }
            if !(100..600).contains(&status) {
                return Err(DegradationError::BadStatus(prefix, status));
            }
            let mut object = match body {
                serde_json::Value::Object(map) => map,
                _ => return Err(DegradationError::BadBody(prefix)),
            };
            object.insert("source".to_string(), serde_json::json!("degraded"));
            object.insert("version".to_string(), serde_json::json!(CATALOG_VERSION));

            let rendered = serde_json::to_vec(&serde_json::Value::Object(object))
                .map_err(|_| DegradationError::BadBody(prefix.clone()))?;

            routes.push(DegradedRoute {
                prefix,
                payload: ResponsePayload::new(
                    status,
                    vec![("content-type".to_string(), "application/json".to_string())],
                    Bytes::from(rendered),
                ),
            });
        }

        // Longest prefix first so the most specific rule matches.
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        Ok(Self {
            routes,
            default_payload: Self::built_in_default(),
        })
    }

    /// Catalog with only the built-in default payload.
    pub fn default_only() -> Self {
        Self {
            routes: Vec::new(),
            default_payload: Self::built_in_default(),
        }
    }

    /// Startup validation: every payload must be non-empty, already
    /// rendered JSON. Construction enforces this, so this is a cheap
    /// re-check for the composition root to fail loudly on.
    pub fn validate(&self) -> Result<(), DegradationError> {
        for route in &self.routes {
            if route.payload.body.is_empty() {
                return Err(DegradationError::BadBody(route.prefix.clone()));
            }
        }
        debug_assert!(!self.default_payload.body.is_empty());
        Ok(())
    }

    /// Produce the degraded response for a path. Infallible by design.
    pub fn response_for(&self, path: &str) -> ResponsePayload {
        self.routes
            .iter()
            .find(|r| path.starts_with(r.prefix.as_str()))
            .map(|r| r.payload.clone())
            .unwrap_or_else(|| self.default_payload.clone())
    }

    fn built_in_default() -> ResponsePayload {
        let body = serde_json::json!({
            "source": "degraded",
            "version": CATALOG_VERSION,
            "message": "service temporarily degraded",
        });
        ResponsePayload::new(
            200,
            vec![("content-type".to_string(), "application/json".to_string())],
            Bytes::from(serde_json::to_vec(&body).unwrap_or_default()),
        )
    }
}
