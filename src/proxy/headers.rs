//! Header rules applied to relayed responses and outbound requests.
//!
//! # Responsibilities
//! - Strip headers that block embedding/framing (`HEADER_DENYLIST`)
//! - Strip hop-by-hop headers the server re-computes for the relayed body
//! - Inject permissive CORS and framing headers
//! - Merge default and caller-supplied request headers (caller wins)

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

use crate::config::{CorsConfig, ValidationError};
use crate::error::{ProxyError, ProxyResult};

/// Response headers removed from every relayed response on both proxy paths.
pub const HEADER_DENYLIST: &[&str] = &[
    "x-frame-options",
    "content-security-policy",
    "content-security-policy-report-only",
    "cross-origin-opener-policy",
    "cross-origin-embedder-policy",
];

/// Connection-scoped headers that must not be copied onto a re-framed body.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

pub fn is_denied(name: &str) -> bool {
    HEADER_DENYLIST
        .iter()
        .any(|denied| name.eq_ignore_ascii_case(denied))
}

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}

/// Copy upstream headers minus the denylist and hop-by-hop headers.
/// Repeated headers such as `set-cookie` keep every value in order.
pub fn sanitize(upstream: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if is_denied(name.as_str()) || is_hop_by_hop(name.as_str()) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// Pre-validated CORS and framing headers stamped on every relayed response.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    frame_options: Option<HeaderValue>,
}

impl CorsHeaders {
    pub fn from_config(config: &CorsConfig) -> Result<Self, ValidationError> {
        let value = |field: &'static str, raw: &str| {
            HeaderValue::from_str(raw).map_err(|_| ValidationError::HeaderValue { field })
        };
        Ok(Self {
            allow_methods: value("cors.allow_methods", &config.allow_methods)?,
            allow_headers: value("cors.allow_headers", &config.allow_headers)?,
            frame_options: config
                .frame_options
                .as_deref()
                .map(|raw| value("cors.frame_options", raw))
                .transpose()?,
        })
    }

    /// Overwrite any upstream values with the permissive set.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            self.allow_methods.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            self.allow_headers.clone(),
        );
        if let Some(frame_options) = &self.frame_options {
            headers.insert(header::X_FRAME_OPTIONS, frame_options.clone());
        }
    }
}

impl Default for CorsHeaders {
    fn default() -> Self {
        Self {
            allow_methods: HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
            allow_headers: HeaderValue::from_static("*"),
            frame_options: None,
        }
    }
}

/// Convert the caller's JSON header object into a typed map.
///
/// Numbers and booleans are sent as their JSON text, `null` values are
/// dropped, and nested arrays or objects are rejected.
pub fn parse_caller_headers(raw: &Map<String, Value>) -> ProxyResult<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(raw.len());
    for (name, value) in raw {
        let text = match value {
            Value::Null => continue,
            Value::String(text) => text.clone(),
            Value::Bool(_) | Value::Number(_) => value.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(ProxyError::InvalidRequest(format!(
                    "header '{}' must be a string, number or boolean",
                    name
                )))
            }
        };
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ProxyError::InvalidRequest(format!("invalid header name '{}'", name))
        })?;
        let value = HeaderValue::from_str(&text).map_err(|_| {
            ProxyError::InvalidRequest(format!("invalid value for header '{}'", name))
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Ordered merge of two header maps: every caller header replaces the
/// default of the same (case-insensitive) name, the rest are kept.
pub fn merge_headers(defaults: HeaderMap, caller: HeaderMap) -> HeaderMap {
    let mut merged = defaults;
    let mut last = None;
    for (name, value) in caller {
        // `None` names continue the previous header's value list.
        let name = match name {
            Some(name) => {
                merged.remove(&name);
                last = Some(name.clone());
                name
            }
            None => match last.clone() {
                Some(name) => name,
                None => continue,
            },
        };
        merged.append(name, value);
    }
    merged
}
