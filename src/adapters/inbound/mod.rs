//! Inbound Adapters - How requests reach the gateway

mod http_server;

pub use http_server::{build_router, GatewayState, GatewayStatusResponse, HttpServer, TargetStatus};
