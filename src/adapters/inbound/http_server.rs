//! HTTP Gateway Server
//!
//! The single inbound adapter: an axum server whose fallback route
//! hands every request to the router service, plus a small status
//! endpoint reporting target health and cache occupancy.

use crate::application::RouterService;
use crate::domain::entities::{GatewayResponse, ProxyRequest};
use crate::domain::ports::{CacheStore, TargetRegistry};
use crate::infrastructure::ShutdownController;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

/// Largest request body the gateway will buffer for forwarding.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Headers never copied onto the outbound response.
const SKIP_RESPONSE_HEADERS: [&str; 3] = ["connection", "transfer-encoding", "content-length"];

/// Per-target entry in the status response.
#[derive(Debug, Serialize)]
pub struct TargetStatus {
    pub id: String,
    pub endpoint_base: String,
    pub priority: u32,
    pub health: String,
    pub last_latency_ms: Option<u64>,
    pub consecutive_failures: u32,
}

/// Status endpoint response.
#[derive(Debug, Serialize)]
pub struct GatewayStatusResponse {
    pub status: String,
    pub targets: Vec<TargetStatus>,
    pub cache_entries: usize,
}

/// Shared state for the axum handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub router: Arc<RouterService>,
    pub registry: Arc<dyn TargetRegistry>,
    pub cache: Arc<dyn CacheStore>,
    pub shutdown: ShutdownController,
}

/// Build the axum application router.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/gateway/status", get(status_handler))
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The gateway HTTP server.
pub struct HttpServer {
    state: GatewayState,
    listen_addr: String,
}

impl HttpServer {
    pub fn new(state: GatewayState, listen_addr: String) -> Self {
        Self { state, listen_addr }
    }

    /// Bind and serve until the shutdown controller fires.
    pub async fn run(self) -> anyhow::Result<()> {
        let shutdown = self.state.shutdown.clone();
        let app = build_router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("gateway listening on {}", self.listen_addr);

        let mut shutdown_rx = shutdown.subscribe();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

async fn status_handler(State(state): State<GatewayState>) -> Json<GatewayStatusResponse> {
    let targets = state
        .registry
        .get_all()
        .await
        .into_iter()
        .map(|t| TargetStatus {
            id: t.id,
            endpoint_base: t.endpoint_base,
            priority: t.priority,
            health: t.health.as_str().to_string(),
            last_latency_ms: t.last_latency_ms,
            consecutive_failures: t.consecutive_failures,
        })
        .collect();

    Json(GatewayStatusResponse {
        status: "ok".to_string(),
        targets,
        cache_entries: state.cache.count().await,
    })
}

async fn proxy_handler(State(state): State<GatewayState>, request: Request) -> Response {
    let _guard = state.shutdown.request_guard();
    let request_id = Uuid::new_v4();

    let proxy_request = match into_proxy_request(request).await {
        Ok(r) => r,
        Err(response) => return response,
    };

    let span = tracing::info_span!("request", %request_id, path = %proxy_request.path);
    let gateway_response = state.router.handle(proxy_request).instrument(span).await;

    into_axum_response(gateway_response)
}

async fn into_proxy_request(request: Request) -> Result<ProxyRequest, Response> {
    let (parts, body) = request.into_parts();

    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| {
            (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response()
        })?;

    Ok(ProxyRequest {
        method: parts.method.as_str().to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(|q| q.to_string()),
        headers,
        body,
    })
}

fn into_axum_response(gateway_response: GatewayResponse) -> Response {
    let GatewayResponse { payload, decision } = gateway_response;

    let mut builder = Response::builder()
        .status(StatusCode::from_u16(payload.status).unwrap_or(StatusCode::BAD_GATEWAY));

    for (name, value) in &payload.headers {
        if SKIP_RESPONSE_HEADERS
            .iter()
            .any(|h| name.eq_ignore_ascii_case(h))
        {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            builder = builder.header(name, value);
        }
    }

    builder = builder
        .header("x-gateway-source", decision.source.as_str())
        .header("x-gateway-stale", if decision.stale { "true" } else { "false" });

    builder
        .body(Body::from(payload.body))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}
