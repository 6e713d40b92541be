//! Stub target site that refuses to be framed, for trying the proxy by hand:
//!
//! ```text
//! cargo run --example mock_backend
//! cargo run -- --port 3000
//! curl -i 'http://localhost:3000/proxy?url=http://127.0.0.1:8081/'
//! ```

use axum::{http::header, routing::get, Router};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = Router::new()
        .route(
            "/",
            get(|| async {
                (
                    [
                        (header::X_FRAME_OPTIONS, "DENY"),
                        (header::CONTENT_SECURITY_POLICY, "frame-ancestors 'none'"),
                        (header::CONTENT_TYPE, "text/html; charset=utf-8"),
                    ],
                    "<h1>Hello from the pretend website!</h1>",
                )
            }),
        )
        .route("/status", get(|| async { "Backend is healthy!" }));

    let addr = SocketAddr::from(([127, 0, 0, 1], 8081));
    println!("Pretend website is listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
