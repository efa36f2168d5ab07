//! Reqwest Upstream Client
//!
//! Forwards a request to one target over HTTP with a bounded timeout,
//! mapping transport failures into the upstream error taxonomy.

use crate::domain::entities::{ProxyRequest, ResponsePayload, Target};
use crate::domain::ports::{UpstreamClient, UpstreamError};
use async_trait::async_trait;
use std::time::Duration;

/// Headers that must not be copied between hops.
const HOP_BY_HOP: [&str; 6] = [
    "connection",
    "keep-alive",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// HTTP upstream client with a fixed per-attempt timeout.
pub struct ReqwestUpstreamClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestUpstreamClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    fn build_url(target: &Target, request: &ProxyRequest) -> String {
        let base = target.endpoint_base.trim_end_matches('/');
        match &request.query {
            Some(query) if !query.is_empty() => format!("{}{}?{}", base, request.path, query),
            _ => format!("{}{}", base, request.path),
        }
    }
}

#[async_trait]
impl UpstreamClient for ReqwestUpstreamClient {
    async fn forward(
        &self,
        target: &Target,
        request: &ProxyRequest,
    ) -> Result<ResponsePayload, UpstreamError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| UpstreamError::Connect(format!("bad method: {}", e)))?;

        let mut builder = self
            .client
            .request(method, Self::build_url(target, request))
            .body(request.body.clone());

        for (name, value) in &request.headers {
            if HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h)) {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout(self.timeout.as_millis() as u64)
            } else {
                UpstreamError::Connect(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        // A 5xx is a failed attempt; the router moves to the next target.
        if status >= 500 {
            return Err(UpstreamError::Status(status));
        }

        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| {
                !HOP_BY_HOP
                    .iter()
                    .any(|h| name.as_str().eq_ignore_ascii_case(h))
            })
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout(self.timeout.as_millis() as u64)
            } else {
                UpstreamError::Connect(e.to_string())
            }
        })?;

        Ok(ResponsePayload::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Capability;
    use bytes::Bytes;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn target_for(server: &MockServer) -> Target {
        Target::new(
            "upstream",
            server.uri(),
            1,
            vec![Capability::new("dynamic-api")],
        )
    }

    fn client() -> ReqwestUpstreamClient {
        ReqwestUpstreamClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_forward_preserves_method_path_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .and(query_param("v", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let mut request = ProxyRequest::get("/status");
        request.query = Some("v=1".to_string());

        let payload = client()
            .forward(&target_for(&server), &request)
            .await
            .unwrap();
        assert_eq!(payload.status, 200);
        assert_eq!(payload.body, Bytes::from_static(b"ok"));
    }

    #[tokio::test]
    async fn test_forward_passes_request_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .and(header("x-tenant", "acme"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut request = ProxyRequest::get("/status");
        request
            .headers
            .push(("x-tenant".to_string(), "acme".to_string()));

        let payload = client()
            .forward(&target_for(&server), &request)
            .await
            .unwrap();
        assert_eq!(payload.status, 200);
    }

    #[tokio::test]
    async fn test_forward_5xx_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client()
            .forward(&target_for(&server), &ProxyRequest::get("/status"))
            .await;
        assert!(matches!(result, Err(UpstreamError::Status(503))));
    }

    #[tokio::test]
    async fn test_forward_4xx_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let payload = client()
            .forward(&target_for(&server), &ProxyRequest::get("/missing"))
            .await
            .unwrap();
        assert_eq!(payload.status, 404);
    }

    #[tokio::test]
    async fn test_forward_unreachable_target_is_connect_error() {
        let target = Target::new(
            "dead",
            "http://127.0.0.1:59999",
            1,
            vec![Capability::new("dynamic-api")],
        );

        let result = client().forward(&target, &ProxyRequest::get("/status")).await;
        assert!(matches!(result, Err(UpstreamError::Connect(_))));
    }

    #[tokio::test]
    async fn test_forward_slow_target_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = ReqwestUpstreamClient::new(Duration::from_millis(100)).unwrap();
        let result = client
            .forward(&target_for(&server), &ProxyRequest::get("/slow"))
            .await;
        assert!(matches!(result, Err(UpstreamError::Timeout(_))));
    }

    #[test]
    fn test_build_url_joins_base_and_path() {
        let target = Target::new("t", "http://backend:8080/", 1, vec![]);
        let request = ProxyRequest::get("/api/status");
        assert_eq!(
            ReqwestUpstreamClient::build_url(&target, &request),
            "http://backend:8080/api/status"
        );
    }

    #[test]
    fn test_build_url_appends_query() {
        let target = Target::new("t", "http://backend:8080", 1, vec![]);
        let mut request = ProxyRequest::get("/api/status");
        request.query = Some("a=1".to_string());
        assert_eq!(
            ReqwestUpstreamClient::build_url(&target, &request),
            "http://backend:8080/api/status?a=1"
        );
    }
}
