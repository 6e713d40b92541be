//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, redirect cap)
//! - Reject strings that cannot be sent as header values
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// Upper bound on configurable redirect hops.
pub const MAX_REDIRECT_CAP: usize = 20;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("upstream.timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("upstream.max_redirects must be at most {MAX_REDIRECT_CAP} (got {0})")]
    TooManyRedirects(usize),

    #[error("upstream.user_agent must not be empty")]
    EmptyUserAgent,

    #[error("{field} is not a valid header value")]
    HeaderValue { field: &'static str },

    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let upstream = &config.upstream;
    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if upstream.max_redirects > MAX_REDIRECT_CAP {
        errors.push(ValidationError::TooManyRedirects(upstream.max_redirects));
    }
    if upstream.user_agent.trim().is_empty() {
        errors.push(ValidationError::EmptyUserAgent);
    }

    let header_fields = [
        ("upstream.user_agent", &upstream.user_agent),
        ("upstream.accept", &upstream.accept),
        ("upstream.accept_language", &upstream.accept_language),
        ("cors.allow_methods", &config.cors.allow_methods),
        ("cors.allow_headers", &config.cors.allow_headers),
    ];
    let frame_options = config
        .cors
        .frame_options
        .as_ref()
        .map(|value| ("cors.frame_options", value));
    let header_fields = header_fields.into_iter().chain(frame_options);
    for (field, value) in header_fields {
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::HeaderValue { field });
        }
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
