//! Router Service - Main application use case
//!
//! The per-request decision engine: consult the cache, walk the
//! failover plan, fall back to stale data and finally to the
//! degradation catalog. Every inbound request goes through `handle`,
//! and `handle` always produces a response.

use crate::domain::entities::{
    CacheEntry, GatewayResponse, ProbeOutcome, ProxyRequest, ResponseSource, RoutingDecision,
};
use crate::domain::ports::{CacheStore, TargetRegistry, UpstreamClient};
use crate::domain::services::{DegradationCatalog, FailoverPolicy, RouteRule, RouteTable};
use crate::domain::value_objects::CacheKey;
use std::sync::Arc;
use std::time::Instant;

/// Request router over the cache, target registry and upstream client.
///
/// Failure semantics: a failed attempt against one target is never
/// retried against the same target within a request; the router moves
/// to the next plan entry. All per-target failures are absorbed here
/// and fed back into the health state as passive observations.
pub struct RouterService {
    cache: Arc<dyn CacheStore>,
    registry: Arc<dyn TargetRegistry>,
    upstream: Arc<dyn UpstreamClient>,
    routes: RouteTable,
    degradation: DegradationCatalog,
}

impl RouterService {
    pub fn new(
        cache: Arc<dyn CacheStore>,
        registry: Arc<dyn TargetRegistry>,
        upstream: Arc<dyn UpstreamClient>,
        routes: RouteTable,
        degradation: DegradationCatalog,
    ) -> Self {
        Self {
            cache,
            registry,
            upstream,
            routes,
            degradation,
        }
    }

    /// Route one request. Never fails: the worst case is a degraded
    /// synthetic response from the catalog.
    pub async fn handle(&self, request: ProxyRequest) -> GatewayResponse {
        let started = Instant::now();
        let rule = self.routes.resolve(&request.path);
        let key = Self::cache_key(&request, rule);

        // 1. Fresh cache hit short-circuits everything.
        if rule.cacheable {
            if let Some(entry) = self.cache.get(&key).await {
                if entry.is_fresh() {
                    return self.finish(
                        started,
                        entry.payload.clone(),
                        RoutingDecision {
                            source: ResponseSource::Cache,
                            target_id: Some(entry.origin_target_id.clone()),
                            cache_hit: true,
                            stale: false,
                            latency_ms: 0,
                        },
                    );
                }
            }
        }

        // 2. Walk the failover plan in order, one attempt per target.
        let targets = self.registry.get_all().await;
        let plan = FailoverPolicy::plan_for(&targets, &rule.capability);

        for target_id in &plan {
            let Some(target) = self.registry.get_by_id(target_id).await else {
                continue;
            };

            let attempt_started = Instant::now();
            match self.upstream.forward(&target, &request).await {
                Ok(payload) => {
                    let latency_ms = attempt_started.elapsed().as_millis() as u64;
                    self.registry
                        .record_outcome(target_id, ProbeOutcome::Success { latency_ms })
                        .await;

                    if rule.cacheable && payload.is_success() {
                        self.cache
                            .put(CacheEntry::new(
                                key.clone(),
                                payload.clone(),
                                target_id.clone(),
                                rule.ttl,
                            ))
                            .await;
                    }

                    return self.finish(
                        started,
                        payload,
                        RoutingDecision {
                            source: ResponseSource::Live,
                            target_id: Some(target_id.clone()),
                            cache_hit: false,
                            stale: false,
                            latency_ms,
                        },
                    );
                }
                Err(err) => {
                    tracing::debug!("attempt against {} failed: {}", target_id, err);
                    self.registry
                        .record_outcome(
                            target_id,
                            ProbeOutcome::Failure {
                                error: err.to_string(),
                            },
                        )
                        .await;
                }
            }
        }

        // 3. Every target failed: a stale entry within the max-stale
        // bound beats synthetic output.
        if rule.cacheable {
            if let Some(entry) = self.cache.get(&key).await {
                return self.finish(
                    started,
                    entry.payload.clone(),
                    RoutingDecision {
                        source: ResponseSource::Cache,
                        target_id: Some(entry.origin_target_id.clone()),
                        cache_hit: true,
                        stale: true,
                        latency_ms: 0,
                    },
                );
            }
        }

        // 4. Last resort: the degradation catalog, which cannot fail.
        let payload = self.degradation.response_for(&request.path);
        self.finish(
            started,
            payload,
            RoutingDecision {
                source: ResponseSource::Degraded,
                target_id: None,
                cache_hit: false,
                stale: false,
                latency_ms: 0,
            },
        )
    }

    fn cache_key(request: &ProxyRequest, rule: &RouteRule) -> CacheKey {
        let vary: Vec<(String, String)> = rule
            .vary_headers
            .iter()
            .filter_map(|name| {
                request
                    .header(name)
                    .map(|value| (name.clone(), value.to_string()))
            })
            .collect();
        CacheKey::from_parts(
            &request.method,
            &request.path,
            request.query.as_deref(),
            &vary,
        )
    }

    fn finish(
        &self,
        started: Instant,
        payload: crate::domain::entities::ResponsePayload,
        decision: RoutingDecision,
    ) -> GatewayResponse {
        tracing::info!(
            source = decision.source.as_str(),
            target_id = decision.target_id.as_deref().unwrap_or("-"),
            cache_hit = decision.cache_hit,
            stale = decision.stale,
            latency_ms = started.elapsed().as_millis() as u64,
            "routing decision"
        );
        GatewayResponse { payload, decision }
    }
}
