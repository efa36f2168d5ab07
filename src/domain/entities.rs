//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the gateway domain.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::{CacheKey, Capability};
use bytes::Bytes;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Health classification for a target.
///
/// Targets start as `Unknown` until the first probe or proxy attempt
/// reports an outcome. The rank ordering biases the failover plan
/// toward healthier targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Unknown,
    Healthy,
    Degraded,
    Unreachable,
}

impl HealthState {
    /// Ordering used by the failover plan: healthy < degraded <
    /// unreachable < unknown.
    pub fn rank(&self) -> u8 {
        match self {
            HealthState::Healthy => 0,
            HealthState::Degraded => 1,
            HealthState::Unreachable => 2,
            HealthState::Unknown => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Unknown => "unknown",
            HealthState::Healthy => "healthy",
            HealthState::Degraded => "degraded",
            HealthState::Unreachable => "unreachable",
        }
    }
}

/// Thresholds governing health transitions.
#[derive(Debug, Clone)]
pub struct HealthPolicy {
    /// Consecutive failures before a target is marked unreachable
    pub failure_threshold: u32,
    /// Latency above which a reachable target counts as degraded
    pub degraded_latency: Duration,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 2,
            degraded_latency: Duration::from_millis(1000),
        }
    }
}

/// Outcome of a single probe or proxy attempt against a target.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    Success { latency_ms: u64 },
    Failure { error: String },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }
}

/// A backend the gateway can route requests to.
///
/// Targets are created once at startup from static configuration and are
/// never removed at runtime. Only the health fields mutate, and only
/// through [`Target::observe`].
#[derive(Debug, Clone)]
pub struct Target {
    /// Stable identifier ("primary", "mirror-a", ...)
    pub id: String,
    /// URL prefix requests are forwarded to
    pub endpoint_base: String,
    /// Lower = preferred within the same health rank
    pub priority: u32,
    /// Tags describing what this target can serve
    pub capabilities: Vec<Capability>,
    /// Path used for active liveness probes
    pub probe_path: String,
    /// Current health classification
    pub health: HealthState,
    /// When the last probe or proxy outcome was recorded
    pub last_checked_at: Option<Instant>,
    /// Latency of the last successful outcome
    pub last_latency_ms: Option<u64>,
    /// Consecutive failed outcomes since the last success
    pub consecutive_failures: u32,
}

impl Target {
    /// Create a target in its initial (unknown) health state.
    pub fn new(
        id: impl Into<String>,
        endpoint_base: impl Into<String>,
        priority: u32,
        capabilities: Vec<Capability>,
    ) -> Self {
        Self {
            id: id.into(),
            endpoint_base: endpoint_base.into(),
            priority,
            capabilities,
            probe_path: "/health".to_string(),
            health: HealthState::Unknown,
            last_checked_at: None,
            last_latency_ms: None,
            consecutive_failures: 0,
        }
    }

    pub fn with_probe_path(mut self, path: impl Into<String>) -> Self {
        self.probe_path = path.into();
        self
    }

    pub fn has_capability(&self, capability: &Capability) -> bool {
        self.capabilities.contains(capability)
    }

    /// The shared state-update function: both active probes and passive
    /// proxy observations feed through here.
    ///
    /// A single failure never flips a previously reachable target to
    /// unreachable; it takes `failure_threshold` consecutive failures
    /// (hysteresis against one-off blips).
    pub fn observe(&mut self, outcome: &ProbeOutcome, policy: &HealthPolicy) {
        match outcome {
            ProbeOutcome::Success { latency_ms } => {
                self.consecutive_failures = 0;
                self.last_latency_ms = Some(*latency_ms);
                self.health = if Duration::from_millis(*latency_ms) <= policy.degraded_latency {
                    HealthState::Healthy
                } else {
                    HealthState::Degraded
                };
            }
            ProbeOutcome::Failure { .. } => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= policy.failure_threshold {
                    self.health = HealthState::Unreachable;
                }
            }
        }
        self.last_checked_at = Some(Instant::now());
    }
}

/// An inbound request as the router sees it.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ProxyRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            path: path.into(),
            query: None,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response body plus the metadata needed to replay it.
#[derive(Debug, Clone)]
pub struct ResponsePayload {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ResponsePayload {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A previously proxied response held by the cache store.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: ResponsePayload,
    pub origin_target_id: String,
    pub created_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(
        key: CacheKey,
        payload: ResponsePayload,
        origin_target_id: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            key,
            payload,
            origin_target_id: origin_target_id.into(),
            created_at: Instant::now(),
            ttl,
        }
    }

    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.created_at)
    }

    /// Fresh while `now <= created_at + ttl`.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        self.age_at(now) <= self.ttl
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Instant::now())
    }
}

/// Where the response a caller received came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Live,
    Cache,
    Degraded,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Live => "live",
            ResponseSource::Cache => "cache",
            ResponseSource::Degraded => "degraded",
        }
    }
}

/// Ephemeral record of how one request was answered. Logged, never stored.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub source: ResponseSource,
    pub target_id: Option<String>,
    pub cache_hit: bool,
    pub stale: bool,
    pub latency_ms: u64,
}

/// What the router hands back to the inbound adapter.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub payload: ResponsePayload,
    pub decision: RoutingDecision,
}
