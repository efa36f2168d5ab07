//! DashMap Target Registry
//!
//! Implements TargetRegistry over a DashMap so health updates lock one
//! target at a time, never the whole set.

use crate::domain::entities::{HealthPolicy, HealthState, ProbeOutcome, Target};
use crate::domain::ports::TargetRegistry;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// DashMap-backed registry for the statically configured target set.
pub struct DashMapTargetRegistry {
    targets: Arc<DashMap<String, Target>>,
    policy: HealthPolicy,
}

impl DashMapTargetRegistry {
    /// Create a registry from the startup target list. Targets are
    /// never added or removed after this.
    pub fn new(targets: Vec<Target>, policy: HealthPolicy) -> Self {
        let map = DashMap::new();
        for target in targets {
            map.insert(target.id.clone(), target);
        }
        Self {
            targets: Arc::new(map),
            policy,
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[async_trait]
impl TargetRegistry for DashMapTargetRegistry {
    async fn get_all(&self) -> Vec<Target> {
        self.targets.iter().map(|e| e.value().clone()).collect()
    }

    async fn get_by_id(&self, id: &str) -> Option<Target> {
        self.targets.get(id).map(|e| e.value().clone())
    }

    async fn record_outcome(&self, id: &str, outcome: ProbeOutcome) -> Option<HealthState> {
        let mut entry = self.targets.get_mut(id)?;
        let before = entry.health;
        entry.observe(&outcome, &self.policy);
        let after = entry.health;
        drop(entry);

        if before != after {
            match after {
                HealthState::Unreachable => {
                    tracing::warn!("target {} is now unreachable", id)
                }
                state => tracing::info!("target {} is now {}", id, state.as_str()),
            }
        }
        Some(after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Capability;

    fn registry_with(ids: &[&str]) -> DashMapTargetRegistry {
        let targets = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                Target::new(
                    *id,
                    format!("http://{}:8080", id),
                    i as u32 + 1,
                    vec![Capability::new("dynamic-api")],
                )
            })
            .collect();
        DashMapTargetRegistry::new(targets, HealthPolicy::default())
    }

    fn failure() -> ProbeOutcome {
        ProbeOutcome::Failure {
            error: "connection refused".to_string(),
        }
    }

    #[tokio::test]
    async fn test_get_all_returns_every_target() {
        let registry = registry_with(&["primary", "mirror"]);
        let all = registry.get_all().await;
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let registry = registry_with(&["primary"]);
        assert!(registry.get_by_id("primary").await.is_some());
        assert!(registry.get_by_id("ghost").await.is_none());
    }

    #[tokio::test]
    async fn test_record_success_marks_healthy() {
        let registry = registry_with(&["primary"]);

        let state = registry
            .record_outcome("primary", ProbeOutcome::Success { latency_ms: 15 })
            .await;
        assert_eq!(state, Some(HealthState::Healthy));

        let target = registry.get_by_id("primary").await.unwrap();
        assert_eq!(target.last_latency_ms, Some(15));
    }

    #[tokio::test]
    async fn test_record_outcome_unknown_id_is_none() {
        let registry = registry_with(&["primary"]);
        let state = registry.record_outcome("ghost", failure()).await;
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn test_failures_accumulate_to_unreachable() {
        let registry = registry_with(&["primary"]);

        let first = registry.record_outcome("primary", failure()).await;
        assert_eq!(first, Some(HealthState::Unknown));

        let second = registry.record_outcome("primary", failure()).await;
        assert_eq!(second, Some(HealthState::Unreachable));
    }

    #[tokio::test]
    async fn test_success_after_failure_recovers() {
        let registry = registry_with(&["primary"]);
        registry.record_outcome("primary", failure()).await;
        registry.record_outcome("primary", failure()).await;

        let state = registry
            .record_outcome("primary", ProbeOutcome::Success { latency_ms: 8 })
            .await;
        assert_eq!(state, Some(HealthState::Healthy));

        let target = registry.get_by_id("primary").await.unwrap();
        assert_eq!(target.consecutive_failures, 0);
    }

    #[tokio::test]
    async fn test_outcomes_do_not_leak_across_targets() {
        let registry = registry_with(&["primary", "mirror"]);
        registry.record_outcome("primary", failure()).await;
        registry.record_outcome("primary", failure()).await;

        let mirror = registry.get_by_id("mirror").await.unwrap();
        assert_eq!(mirror.health, HealthState::Unknown);
        assert_eq!(mirror.consecutive_failures, 0);
    }
}
