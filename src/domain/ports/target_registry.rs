//! Target Registry Port
//!
//! Defines the interface for the statically configured target set and
//! its health state. Targets are never added or removed at runtime;
//! only their health fields change, through `record_outcome`.

use crate::domain::entities::{HealthState, ProbeOutcome, Target};
use async_trait::async_trait;

/// Registry of configured targets with synchronized health state.
#[async_trait]
pub trait TargetRegistry: Send + Sync {
    /// Snapshot of every configured target, including unreachable ones.
    async fn get_all(&self) -> Vec<Target>;

    /// Get a specific target by id.
    async fn get_by_id(&self, id: &str) -> Option<Target>;

    /// Apply a probe or proxy outcome to a target's health state.
    ///
    /// This is the single write path for health: active probes and
    /// passive proxy observations both land here, under one per-target
    /// read-modify-write. Returns the health state after the update, or
    /// `None` for an unknown id.
    async fn record_outcome(&self, id: &str, outcome: ProbeOutcome) -> Option<HealthState>;
}
