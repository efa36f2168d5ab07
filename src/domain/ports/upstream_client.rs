//! Upstream Client Port
//!
//! Defines the interface for forwarding a request to one target with a
//! bounded timeout. The router drives the failover loop; this port only
//! performs a single attempt.

use crate::domain::entities::{ProxyRequest, ResponsePayload, Target};
use async_trait::async_trait;
use thiserror::Error;

/// Why a single proxy attempt against a target failed.
///
/// These are absorbed by the router (recorded as passive health
/// failures, then the next plan entry is tried); they are never
/// surfaced to the caller.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("target timed out after {0}ms")]
    Timeout(u64),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("upstream returned server error {0}")]
    Status(u16),
}

/// Client capable of forwarding one request to one target.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Forward the request to the target, preserving method, path and
    /// query. Responses with a 5xx status count as failures so the
    /// router falls through to the next target; 2xx-4xx pass through as
    /// valid answers.
    async fn forward(
        &self,
        target: &Target,
        request: &ProxyRequest,
    ) -> Result<ResponsePayload, UpstreamError>;
}
