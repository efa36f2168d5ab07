//! Integration tests for active probing and plan re-ranking
//!
//! Runs the real prober ticker against wiremock backends and checks
//! that the failover plan follows the observed health.

use edge_gateway::{
    Capability, DashMapTargetRegistry, FailoverPolicy, HealthPolicy, HealthProber, HealthState,
    ProbeOutcome, ProberConfig, Target, TargetRegistry,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_prober() -> HealthProber {
    HealthProber::new(ProberConfig {
        interval: Duration::from_millis(50),
        timeout: Duration::from_millis(300),
    })
    .unwrap()
}

#[tokio::test]
async fn test_probe_loop_marks_healthy_and_unreachable() {
    let alive = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&alive)
        .await;

    let registry = Arc::new(DashMapTargetRegistry::new(
        vec![
            Target::new("up", alive.uri(), 1, vec![Capability::new("dynamic-api")]),
            Target::new(
                "down",
                "http://127.0.0.1:59999",
                2,
                vec![Capability::new("dynamic-api")],
            ),
        ],
        HealthPolicy::default(),
    ));

    let (shutdown_tx, _) = broadcast::channel(1);
    fast_prober().start(registry.clone(), shutdown_tx.subscribe());

    // A few probe rounds: enough for the failure threshold of 2.
    tokio::time::sleep(Duration::from_millis(400)).await;
    let _ = shutdown_tx.send(());

    assert_eq!(
        registry.get_by_id("up").await.unwrap().health,
        HealthState::Healthy
    );
    assert_eq!(
        registry.get_by_id("down").await.unwrap().health,
        HealthState::Unreachable
    );
}

#[tokio::test]
async fn test_plan_follows_probed_health() {
    let alive = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&alive)
        .await;

    // Preferred target is dead, backup is alive.
    let registry = Arc::new(DashMapTargetRegistry::new(
        vec![
            Target::new(
                "preferred",
                "http://127.0.0.1:59999",
                1,
                vec![Capability::new("dynamic-api")],
            ),
            Target::new(
                "backup",
                alive.uri(),
                2,
                vec![Capability::new("dynamic-api")],
            ),
        ],
        HealthPolicy::default(),
    ));

    let (shutdown_tx, _) = broadcast::channel(1);
    fast_prober().start(registry.clone(), shutdown_tx.subscribe());
    tokio::time::sleep(Duration::from_millis(400)).await;
    let _ = shutdown_tx.send(());

    let targets = registry.get_all().await;
    let plan = FailoverPolicy::plan_for(&targets, &Capability::new("dynamic-api"));
    assert_eq!(plan, vec!["backup", "preferred"]);
}

#[tokio::test]
async fn test_single_probe_blip_does_not_flip_target() {
    let registry = Arc::new(DashMapTargetRegistry::new(
        vec![Target::new(
            "primary",
            "http://primary:8080",
            1,
            vec![Capability::new("dynamic-api")],
        )],
        HealthPolicy::default(),
    ));

    registry
        .record_outcome("primary", ProbeOutcome::Success { latency_ms: 10 })
        .await;
    registry
        .record_outcome(
            "primary",
            ProbeOutcome::Failure {
                error: "blip".to_string(),
            },
        )
        .await;
    registry
        .record_outcome("primary", ProbeOutcome::Success { latency_ms: 10 })
        .await;

    let target = registry.get_by_id("primary").await.unwrap();
    assert_eq!(target.health, HealthState::Healthy);
    assert_eq!(target.consecutive_failures, 0);
}
