//! The proxy transform: one inbound request in, one relayed response out.

use std::sync::Arc;

use axum::{
    body::Body,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use tracing::Level;

use crate::error::ProxyError;
use crate::observability::EventLog;
use crate::proxy::headers::{sanitize, CorsHeaders};
use crate::proxy::request::{ProxyQuery, ProxyRequest};
use crate::proxy::upstream::{UpstreamClient, UpstreamResponse};

/// Stateless handler shared by every request; cloning is cheap.
#[derive(Clone)]
pub struct ProxyHandler {
    client: UpstreamClient,
    cors: CorsHeaders,
    log: Arc<dyn EventLog>,
}

impl ProxyHandler {
    pub fn new(client: UpstreamClient, cors: CorsHeaders, log: Arc<dyn EventLog>) -> Self {
        Self { client, cors, log }
    }

    /// `GET /proxy?url=...`
    pub async fn handle_get(&self, query: ProxyQuery) -> Response {
        let req = match ProxyRequest::from_query(query) {
            Ok(req) => req,
            Err(err) => return self.reject(None, err),
        };
        match self.client.browser_headers(&req.target) {
            Ok(defaults) => self.forward(req, defaults).await,
            Err(err) => self.reject(Some(&req.target), err),
        }
    }

    /// `POST /proxy` with a JSON body.
    pub async fn handle_post(&self, raw: &[u8]) -> Response {
        match ProxyRequest::from_json_bytes(raw) {
            Ok(req) => {
                let defaults = self.client.forward_headers();
                self.forward(req, defaults).await
            }
            Err(err) => self.reject(None, err),
        }
    }

    /// `GET /proxy` whose query string could not be decoded.
    pub fn reject_query(&self, message: String) -> Response {
        self.reject(None, ProxyError::InvalidRequest(message))
    }

    async fn forward(&self, req: ProxyRequest, defaults: HeaderMap) -> Response {
        let target = req.target.clone();
        self.log.log(
            Level::INFO,
            "proxy.dispatch",
            &[("method", &req.method), ("target", &target)],
        );

        match self.client.send(req, defaults).await {
            Ok(upstream) => {
                self.log.log(
                    Level::INFO,
                    "proxy.relayed",
                    &[("target", &target), ("status", &upstream.status.as_u16())],
                );
                self.relay(upstream)
            }
            Err(err) => self.reject(Some(&target), err),
        }
    }

    /// Upstream status and body verbatim; headers sanitized and widened.
    fn relay(&self, upstream: UpstreamResponse) -> Response {
        let mut headers = sanitize(&upstream.headers);
        self.cors.apply(&mut headers);

        let mut response = Response::new(Body::from(upstream.body));
        *response.status_mut() = upstream.status;
        *response.headers_mut() = headers;
        response
    }

    fn reject(&self, target: Option<&str>, err: ProxyError) -> Response {
        let status = err.status();
        let level = if status.is_server_error() {
            Level::ERROR
        } else {
            Level::WARN
        };
        self.log.log(
            level,
            "proxy.failed",
            &[
                ("target", &target.unwrap_or("-")),
                ("status", &status.as_u16()),
                ("error", &err),
            ],
        );

        let mut response = err.into_response();
        self.cors.apply(response.headers_mut());
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpstreamConfig;
    use crate::observability::MemoryLog;
    use axum::http::{header, StatusCode};

    fn handler(log: Arc<MemoryLog>) -> ProxyHandler {
        let client = UpstreamClient::new(&UpstreamConfig::default()).unwrap();
        ProxyHandler::new(client, CorsHeaders::default(), log)
    }

    #[tokio::test]
    async fn test_missing_url_rejected_with_cors() {
        let log = Arc::new(MemoryLog::default());
        let response = handler(log.clone()).handle_get(ProxyQuery::default()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        let events = log.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "proxy.failed");
        assert!(events[0].1.contains("status=400"));
    }

    #[tokio::test]
    async fn test_relative_url_fails_before_dispatch() {
        let log = Arc::new(MemoryLog::default());
        let response = handler(log.clone())
            .handle_get(ProxyQuery {
                url: Some("example.com/no-scheme".into()),
            })
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(log.events().iter().all(|(event, _)| event != "proxy.dispatch"));
    }

    #[tokio::test]
    async fn test_post_without_url_is_400() {
        let log = Arc::new(MemoryLog::default());
        let response = handler(log).handle_post(br#"{"method":"POST"}"#).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_relay_preserves_status_and_strips_framing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::X_FRAME_OPTIONS, "DENY".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        let upstream = UpstreamResponse {
            status: StatusCode::NOT_FOUND,
            headers,
            body: "missing".into(),
        };

        let response = handler(Arc::new(MemoryLog::default())).relay(upstream);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::X_FRAME_OPTIONS).is_none());
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
