//! edge-gateway - Cache-and-failover request router
//!
//! This is the composition root that wires together all the components.

mod adapters;
mod application;
mod config;
mod domain;
mod infrastructure;

use crate::adapters::inbound::{GatewayState, HttpServer};
use crate::adapters::outbound::{
    DashMapCacheStore, DashMapTargetRegistry, ReqwestUpstreamClient,
};
use crate::application::RouterService;
use crate::config::{load_config, TargetsFile};
use crate::infrastructure::{shutdown_signal, HealthProber, ProberConfig, ShutdownController};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting edge-gateway listen={} targets={}",
        cfg.listen_addr,
        cfg.targets_path
    );

    // ===== COMPOSITION ROOT =====

    // Static configuration: targets, routes, degraded payloads. A bad
    // degradation catalog must fail here, never at request time.
    let targets_file = TargetsFile::load(&cfg.targets_path)?;
    let targets = targets_file.targets();
    let routes = targets_file.route_table();
    let degradation = targets_file.degradation_catalog()?;

    tracing::info!("loaded {} targets from {}", targets.len(), cfg.targets_path);

    // Outbound adapters
    let registry = Arc::new(DashMapTargetRegistry::new(targets, cfg.health_policy()));

    let cache = Arc::new(DashMapCacheStore::new(Duration::from_secs(
        cfg.max_stale_secs,
    )));
    cache.start_sweep(Duration::from_secs(cfg.cache_sweep_interval_secs));

    let upstream = Arc::new(ReqwestUpstreamClient::new(Duration::from_secs(
        cfg.proxy_timeout_secs,
    ))?);

    // Application service
    let router = Arc::new(RouterService::new(
        cache.clone(),
        registry.clone(),
        upstream,
        routes,
        degradation,
    ));

    // Background health prober
    let shutdown = ShutdownController::new();
    let prober = HealthProber::new(ProberConfig {
        interval: Duration::from_secs(cfg.health_check_interval_secs),
        timeout: Duration::from_secs(cfg.probe_timeout_secs),
    })?;
    prober.start(registry.clone(), shutdown.subscribe());

    tokio::spawn(shutdown_signal(shutdown.clone()));

    // Inbound adapter
    let server = HttpServer::new(
        GatewayState {
            router,
            registry,
            cache,
            shutdown: shutdown.clone(),
        },
        cfg.listen_addr.clone(),
    );

    server.run().await?;

    // Server stopped accepting; let in-flight requests finish.
    shutdown.shutdown();
    shutdown
        .wait_for_drain(Duration::from_secs(cfg.drain_timeout_secs))
        .await;
    tracing::info!("edge-gateway stopped");

    Ok(())
}
