//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! proxy handler
//!     → EventLog::log(level, event, fields)
//!     → TracingLog → tracing subscriber (stdout, pretty or JSON)
//!
//! every inbound request
//!     → tower_http TraceLayer span (method, uri, x-request-id)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Request ID flows through the access log span
//! - No metrics pipeline

pub mod logging;

pub use logging::{EventLog, MemoryLog, NoopLog, TracingLog};
