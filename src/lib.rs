//! Frame Proxy Library
//!
//! Fetches third-party resources on behalf of browser clients, strips the
//! response headers that block framing, and adds permissive CORS headers.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use config::ProxyConfig;
pub use error::{ProxyError, ProxyResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
