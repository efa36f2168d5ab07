//! Failover Policy Service
//!
//! Pure domain logic for ranking targets into an ordered attempt list.
//! This service has NO external dependencies - it's pure Rust.

use crate::domain::entities::Target;
use crate::domain::value_objects::Capability;

/// Produces the ordered attempt list for a request.
///
/// Targets are filtered by the required capability, then sorted by
/// `(health rank, priority, id)`:
/// 1. Health rank: healthy < degraded < unreachable < unknown
/// 2. Priority ascending (lower = preferred)
/// 3. Id ascending, so equal targets order deterministically
///
/// The plan always contains every matching target - even all-unreachable
/// ones - so a total outage still yields a deterministic, exhaustible
/// attempt order before the router falls back to degraded output.
pub struct FailoverPolicy;

impl FailoverPolicy {
    /// Compute the ordered target-id list for a required capability.
    pub fn plan_for(targets: &[Target], capability: &Capability) -> Vec<String> {
        let mut matching: Vec<&Target> = targets
            .iter()
            .filter(|t| t.has_capability(capability))
            .collect();

        matching.sort_by(|a, b| {
            a.health
                .rank()
                .cmp(&b.health.rank())
                .then(a.priority.cmp(&b.priority))
                .then(a.id.cmp(&b.id))
        });

        matching.into_iter().map(|t| t.id.clone()).collect()
    }
}
