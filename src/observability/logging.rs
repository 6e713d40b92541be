//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global `tracing` subscriber
//! - Provide the `EventLog` capability injected into the proxy handler
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level
//! - JSON format for production, pretty format for development
//! - The handler only sees `EventLog`, never a concrete backend

use std::fmt;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, ObservabilityConfig};

/// One named field attached to a log event.
pub type Field<'a> = (&'a str, &'a dyn fmt::Display);

/// Sink for structured log events emitted by the proxy core.
pub trait EventLog: Send + Sync {
    fn log(&self, level: Level, event: &str, fields: &[Field<'_>]);
}

/// Renders fields as `key=value` pairs separated by spaces.
struct Fields<'a>(&'a [Field<'a>]);

impl fmt::Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// `EventLog` backed by the global `tracing` dispatcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl EventLog for TracingLog {
    fn log(&self, level: Level, event: &str, fields: &[Field<'_>]) {
        let fields = Fields(fields);
        match level {
            Level::ERROR => tracing::error!(event, fields = %fields),
            Level::WARN => tracing::warn!(event, fields = %fields),
            Level::INFO => tracing::info!(event, fields = %fields),
            Level::DEBUG => tracing::debug!(event, fields = %fields),
            _ => tracing::trace!(event, fields = %fields),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLog;

impl EventLog for NoopLog {
    fn log(&self, _level: Level, _event: &str, _fields: &[Field<'_>]) {}
}

/// Keeps events in memory as `(event, "k=v ...")` pairs.
#[derive(Debug, Default)]
pub struct MemoryLog {
    events: Mutex<Vec<(String, String)>>,
}

impl MemoryLog {
    pub fn events(&self) -> Vec<(String, String)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventLog for MemoryLog {
    fn log(&self, _level: Level, event: &str, fields: &[Field<'_>]) {
        if let Ok(mut events) = self.events.lock() {
            events.push((event.to_string(), Fields(fields).to_string()));
        }
    }
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "frame_proxy={level},tower_http={level}",
            level = config.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
    if result.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}
