//! Inbound request shapes and their translation into a `ProxyRequest`.

use axum::http::{HeaderMap, HeaderValue, Method};
use serde::Deserialize;

use crate::error::{ProxyError, ProxyResult};
use crate::proxy::headers::parse_caller_headers;

/// Query string of `GET /proxy`.
#[derive(Debug, Default, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

/// JSON body of `POST /proxy`. Every field may be absent or `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProxyPayload {
    pub url: Option<String>,
    pub method: Option<String>,
    pub headers: Option<serde_json::Map<String, serde_json::Value>>,
    pub body: Option<serde_json::Value>,
}

/// Outbound payload carried by a POST-path request.
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyBody {
    /// A JSON string, sent as its raw text.
    Text(String),
    /// Any other JSON value, sent serialized.
    Json(serde_json::Value),
}

impl ProxyBody {
    fn from_value(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) => Some(ProxyBody::Text(text)),
            other => Some(ProxyBody::Json(other)),
        }
    }

    /// Content type used when the caller did not set one.
    pub fn content_type(&self) -> HeaderValue {
        match self {
            ProxyBody::Text(_) => HeaderValue::from_static("text/plain; charset=utf-8"),
            ProxyBody::Json(_) => HeaderValue::from_static("application/json"),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ProxyBody::Text(text) => text.into_bytes(),
            ProxyBody::Json(value) => value.to_string().into_bytes(),
        }
    }
}

/// One outbound call, built per inbound request.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub target: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<ProxyBody>,
}

fn required_url(url: Option<String>, missing: ProxyError) -> ProxyResult<String> {
    match url {
        Some(url) if !url.is_empty() => Ok(url),
        _ => Err(missing),
    }
}

impl ProxyRequest {
    /// Build the GET-path request. The URL is not validated here; malformed
    /// targets surface as upstream failures.
    pub fn from_query(query: ProxyQuery) -> ProxyResult<Self> {
        let target = required_url(query.url, ProxyError::MissingUrlParam)?;
        Ok(Self {
            target,
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    pub fn from_payload(payload: ProxyPayload) -> ProxyResult<Self> {
        let target = required_url(payload.url, ProxyError::MissingUrlField)?;

        let method = match payload.method.as_deref() {
            None | Some("") => Method::GET,
            Some(raw) => Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
                .map_err(|_| ProxyError::InvalidRequest(format!("invalid method '{}'", raw)))?,
        };

        Ok(Self {
            target,
            method,
            headers: parse_caller_headers(&payload.headers.unwrap_or_default())?,
            body: payload.body.and_then(ProxyBody::from_value),
        })
    }

    /// Parse a raw POST body. An empty body is treated as `{}`.
    pub fn from_json_bytes(raw: &[u8]) -> ProxyResult<Self> {
        let payload = if raw.iter().all(u8::is_ascii_whitespace) {
            ProxyPayload::default()
        } else {
            serde_json::from_slice(raw)
                .map_err(|e| ProxyError::InvalidRequest(format!("invalid JSON body: {}", e)))?
        };
        Self::from_payload(payload)
    }
}
