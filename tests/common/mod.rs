//! Shared utilities for integration tests: stub target sites and a proxy
//! bound to an ephemeral port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{any, get},
    Json, Router,
};
use frame_proxy::observability::{EventLog, NoopLog};
use frame_proxy::{HttpServer, ProxyConfig, Shutdown};
use tokio::net::TcpListener;

/// Serve `app` on `127.0.0.1:0` and return the bound address.
pub async fn start_backend(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A site that forbids framing, plus helpers for status, echo, redirects
/// and slowness.
pub fn stub_site() -> Router {
    Router::new()
        .route("/hello", get(hello))
        .route("/status/{code}", get(status))
        .route("/echo", any(echo))
        .route("/binary", get(binary))
        .route("/slow", get(slow))
        .route("/redirect/{hops}", get(redirect))
        .route("/loop", get(|| async { Redirect::temporary("/loop") }))
}

async fn hello() -> impl IntoResponse {
    (
        [
            (header::X_FRAME_OPTIONS, "DENY"),
            (header::CONTENT_SECURITY_POLICY, "frame-ancestors 'none'"),
            (
                header::CONTENT_SECURITY_POLICY_REPORT_ONLY,
                "default-src 'self'",
            ),
            (header::HeaderName::from_static("cross-origin-opener-policy"), "same-origin"),
            (header::HeaderName::from_static("cross-origin-embedder-policy"), "require-corp"),
            (header::HeaderName::from_static("x-upstream"), "stub"),
        ],
        "hello",
    )
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::IM_A_TEAPOT);
    (status, format!("status {}", code))
}

/// Reflects the request back as JSON.
async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<serde_json::Value> {
    let headers: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                serde_json::Value::String(value.to_str().unwrap_or_default().to_string()),
            )
        })
        .collect();
    Json(serde_json::json!({
        "method": method.as_str(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

pub const BINARY_BODY: &[u8] = &[0x89, b'P', b'N', b'G', 0x00, 0xff, 0x10, 0x80];

async fn binary() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], BINARY_BODY)
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "too late"
}

async fn redirect(Path(hops): Path<u32>) -> axum::response::Response {
    if hops == 0 {
        "arrived".into_response()
    } else {
        Redirect::temporary(&format!("/redirect/{}", hops - 1)).into_response()
    }
}

/// Proxy config suited to tests: local only, short timeout.
pub fn test_config() -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.timeout_secs = 1;
    config.upstream.use_system_proxy = false;
    config
}

pub struct RunningProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl RunningProxy {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for RunningProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_proxy(config: ProxyConfig) -> RunningProxy {
    start_proxy_with_log(config, Arc::new(NoopLog)).await
}

pub async fn start_proxy_with_log(config: ProxyConfig, log: Arc<dyn EventLog>) -> RunningProxy {
    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::with_log(config, log).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    RunningProxy { addr, shutdown }
}

/// Plain client that never goes through a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}
