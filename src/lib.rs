//! edge-gateway Library
//!
//! This module exposes the gateway components for use in integration
//! tests and as a library.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::inbound::{build_router, GatewayState, HttpServer};
pub use adapters::outbound::{DashMapCacheStore, DashMapTargetRegistry, ReqwestUpstreamClient};
pub use application::RouterService;
pub use config::{load_config, Config, TargetsFile};
pub use domain::entities::{
    CacheEntry, GatewayResponse, HealthPolicy, HealthState, ProbeOutcome, ProxyRequest,
    ResponsePayload, ResponseSource, RoutingDecision, Target,
};
pub use domain::ports::{CacheStore, TargetRegistry, UpstreamClient, UpstreamError};
pub use domain::services::{DegradationCatalog, FailoverPolicy, RouteRule, RouteTable};
pub use domain::value_objects::{CacheKey, Capability};
pub use infrastructure::{HealthProber, ProberConfig, ShutdownController};
