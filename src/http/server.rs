//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (CORS, body limit, request ID, tracing)
//! - Serve on a listener until shutdown
//! - Expose a one-request entry point for hosting shims

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{rejection::QueryRejection, DefaultBodyLimit, Query, State},
    http::{header, HeaderValue, Request},
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceExt;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::{ConfigError, ProxyConfig};
use crate::http::request::MakeRequestUuidV4;
use crate::http::status;
use crate::observability::{EventLog, TracingLog};
use crate::proxy::{CorsHeaders, ProxyHandler, ProxyQuery, UpstreamClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub proxy: ProxyHandler,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server logging through `tracing`.
    pub fn new(config: ProxyConfig) -> Result<Self, ConfigError> {
        Self::with_log(config, Arc::new(TracingLog))
    }

    /// Create a new HTTP server with an injected event log.
    pub fn with_log(config: ProxyConfig, log: Arc<dyn EventLog>) -> Result<Self, ConfigError> {
        let client = UpstreamClient::new(&config.upstream)?;
        let cors = CorsHeaders::from_config(&config.cors)?;

        let state = AppState {
            proxy: ProxyHandler::new(client, cors, log),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(status::root))
            .route("/health", get(status::health))
            .route("/proxy", get(proxy_get).post(proxy_post))
            .fallback(status::not_found)
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(SetResponseHeaderLayer::if_not_present(
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ))
            .layer(cors_layer())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle one request without a listener, for per-invocation hosts.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    /// Run the server, accepting connections on the given listener until
    /// the shutdown channel fires or closes.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            timeout_secs = self.config.upstream.timeout_secs,
            max_redirects = self.config.upstream.max_redirects,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Answers every `OPTIONS` preflight and allows any origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn proxy_get(
    State(state): State<AppState>,
    query: Result<Query<ProxyQuery>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(query)) => state.proxy.handle_get(query).await,
        Err(rejection) => state.proxy.reject_query(rejection.body_text()),
    }
}

async fn proxy_post(State(state): State<AppState>, body: Bytes) -> Response {
    state.proxy.handle_post(&body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::{MemoryLog, NoopLog};
    use axum::http::{Method, StatusCode};

    fn server() -> HttpServer {
        HttpServer::with_log(ProxyConfig::default(), Arc::new(NoopLog)).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = server()
            .handle(Request::get("/health").body(Body::empty()).unwrap())
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(response.headers().contains_key(crate::http::X_REQUEST_ID));
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_preflight_on_any_path() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/anything/here")
            .header(header::ORIGIN, "https://app.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = server().handle(request).await;

        assert!(response.status().is_success());
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_get_proxy_without_url() {
        let response = server()
            .handle(Request::get("/proxy").body(Body::empty()).unwrap())
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "URL parameter is required");
        assert_eq!(json["usage"], "/proxy?url=https://example.com");
    }

    #[tokio::test]
    async fn test_post_proxy_without_url() {
        let request = Request::post("/proxy")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"method":"GET"}"#))
            .unwrap();
        let response = server().handle(request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "URL is required in request body"
        );
    }

    #[tokio::test]
    async fn test_unparseable_query_goes_through_reject() {
        let log = Arc::new(MemoryLog::default());
        let server = HttpServer::with_log(ProxyConfig::default(), log.clone()).unwrap();

        let response = server
            .handle(
                Request::get("/proxy?url=https://a.example&url=https://b.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_HEADERS], "*");
        assert_eq!(body_json(response).await["error"], "Invalid proxy request");

        let events = log.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, "proxy.failed");
        assert!(events[0].1.contains("status=400"));
    }

    #[test]
    fn test_bad_config_is_config_error() {
        let mut config = ProxyConfig::default();
        config.upstream.user_agent = "agent\n".into();

        match HttpServer::with_log(config, Arc::new(NoopLog)) {
            Err(err @ ConfigError::Validation(_)) => {
                assert!(err.to_string().contains("upstream.user_agent"));
                assert!(!err.to_string().contains("Invalid proxy request"));
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("server built from an invalid config"),
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_json_404() {
        let response = server()
            .handle(Request::get("/nope").body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Not found");
    }

    #[tokio::test]
    async fn test_oversized_post_rejected() {
        let mut config = ProxyConfig::default();
        config.limits.max_body_bytes = 16;
        let server = HttpServer::with_log(config, Arc::new(NoopLog)).unwrap();

        let request = Request::post("/proxy")
            .body(Body::from(r#"{"url":"https://example.com/a/long/path"}"#))
            .unwrap();
        let response = server.handle(request).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
