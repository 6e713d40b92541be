//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID on the way in and out)
//!     → status.rs (`/`, `/health`, fallback)
//!     → proxy handler (`/proxy`)
//!     → Send to client
//! ```

pub mod request;
pub mod server;
pub mod status;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
