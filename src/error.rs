//! Error types for the proxy handler.
//!
//! Every variant maps to a well-formed JSON reply; none of them is fatal to
//! the process. Upstream 4xx/5xx statuses are not errors and never reach
//! this type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Usage hint returned when `GET /proxy` is called without `url`.
pub const GET_USAGE: &str = "/proxy?url=https://example.com";

/// Errors that can occur while relaying a request.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// `url` missing from the query string.
    #[error("URL parameter is required")]
    MissingUrlParam,

    /// `url` missing from the POST body.
    #[error("URL is required in request body")]
    MissingUrlField,

    /// Caller input present but unusable (bad JSON, method or header).
    #[error("Invalid proxy request: {0}")]
    InvalidRequest(String),

    /// Transport failure reaching the target, including timeouts,
    /// redirect overflow and malformed target URLs.
    #[error("Proxy request failed: {0}")]
    Upstream(String),
}

/// Result type alias for proxy operations.
pub type ProxyResult<T> = Result<T, ProxyError>;

/// JSON body shared by every error reply.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            usage: None,
        }
    }
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingUrlParam
            | ProxyError::MissingUrlField
            | ProxyError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ProxyError::MissingUrlParam => ErrorBody {
                usage: Some(GET_USAGE.to_string()),
                ..ErrorBody::new(self.to_string())
            },
            ProxyError::MissingUrlField => ErrorBody::new(self.to_string()),
            ProxyError::InvalidRequest(message) => ErrorBody {
                message: Some(message.clone()),
                ..ErrorBody::new("Invalid proxy request")
            },
            ProxyError::Upstream(message) => ErrorBody {
                message: Some(message.clone()),
                ..ErrorBody::new("Proxy request failed")
            },
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_param_carries_usage() {
        let err = ProxyError::MissingUrlParam;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let json = serde_json::to_value(err.body()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": "URL parameter is required",
                "usage": "/proxy?url=https://example.com",
            })
        );
    }

    #[test]
    fn test_upstream_failure_is_500_with_message() {
        let err = ProxyError::Upstream("connection refused".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = serde_json::to_value(err.body()).unwrap();
        assert_eq!(json["error"], "Proxy request failed");
        assert_eq!(json["message"], "connection refused");
        assert!(json.get("usage").is_none());
    }

    #[test]
    fn test_missing_field_has_only_error() {
        let json = serde_json::to_value(ProxyError::MissingUrlField.body()).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "URL is required in request body" }));
    }
}
