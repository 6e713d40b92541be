//! Forwarding proxy core.
//!
//! # Data Flow
//! ```text
//! GET /proxy?url=...            POST /proxy {url, method, headers, body}
//!     → request.rs (ProxyRequest, url required)
//!     → upstream.rs (default headers, merged caller headers, reqwest call)
//!     → headers.rs (denylist + hop-by-hop stripped, CORS stamped)
//!     → handler.rs (status and body relayed verbatim)
//! ```
//!
//! # Design Decisions
//! - No state between requests; the handler is cloned into every task
//! - Upstream 4xx/5xx are relayed, only transport failures become errors
//! - One denylist for both paths

pub mod handler;
pub mod headers;
pub mod request;
pub mod upstream;

pub use handler::ProxyHandler;
pub use headers::{CorsHeaders, HEADER_DENYLIST};
pub use request::{ProxyBody, ProxyPayload, ProxyQuery, ProxyRequest};
pub use upstream::{UpstreamClient, UpstreamResponse};
