//! Outbound HTTP client.
//!
//! # Responsibilities
//! - Issue the outbound call for a `ProxyRequest`
//! - Bound redirects and total call time
//! - Buffer the upstream response for relaying
//!
//! # Design Decisions
//! - One `reqwest::Client` shared by all requests (internally pooled)
//! - Non-2xx statuses are returned as responses; `error_for_status` is never used
//! - Transport failures collapse into `ProxyError::Upstream` with a readable cause

use std::error::Error as _;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use reqwest::redirect::Policy;
use url::{Origin, Url};

use crate::config::{ConfigError, UpstreamConfig, ValidationError};
use crate::error::{ProxyError, ProxyResult};
use crate::proxy::headers::merge_headers;
use crate::proxy::request::ProxyRequest;

/// Buffered reply from the target.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Default headers sent by the two proxy paths.
#[derive(Debug, Clone)]
struct DefaultHeaders {
    user_agent: HeaderValue,
    accept: HeaderValue,
    accept_language: HeaderValue,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    defaults: DefaultHeaders,
    timeout: Duration,
    max_redirects: usize,
}

impl UpstreamClient {
    /// Build the shared client. Fails only on unusable configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ConfigError> {
        let value = |field: &'static str, raw: &str| {
            HeaderValue::from_str(raw).map_err(|_| ValidationError::HeaderValue { field })
        };
        let defaults = DefaultHeaders {
            user_agent: value("upstream.user_agent", &config.user_agent)?,
            accept: value("upstream.accept", &config.accept)?,
            accept_language: value("upstream.accept_language", &config.accept_language)?,
        };

        let mut builder = reqwest::Client::builder()
            .redirect(Policy::limited(config.max_redirects))
            .timeout(config.timeout());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            defaults,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        })
    }

    /// Headers for the GET path: browser-like defaults plus a `Referer`
    /// set to the target's origin.
    pub fn browser_headers(&self, target: &str) -> ProxyResult<HeaderMap> {
        let referer = origin_of(target)?;
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, self.defaults.user_agent.clone());
        headers.insert(header::ACCEPT, self.defaults.accept.clone());
        headers.insert(header::ACCEPT_LANGUAGE, self.defaults.accept_language.clone());
        headers.insert(
            header::REFERER,
            HeaderValue::from_str(&referer)
                .map_err(|_| ProxyError::Upstream(format!("Invalid URL: {}", target)))?,
        );
        Ok(headers)
    }

    /// Headers for the POST path: only the `User-Agent` default.
    pub fn forward_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, self.defaults.user_agent.clone());
        headers
    }

    /// Perform the outbound call. `defaults` are overridden by any header the
    /// request itself carries.
    pub async fn send(&self, req: ProxyRequest, defaults: HeaderMap) -> ProxyResult<UpstreamResponse> {
        let mut headers = merge_headers(defaults, req.headers);

        let mut builder = self.client.request(req.method, &req.target);
        if let Some(body) = req.body {
            if !headers.contains_key(header::CONTENT_TYPE) {
                headers.insert(header::CONTENT_TYPE, body.content_type());
            }
            builder = builder.body(body.into_bytes());
        }

        let response = builder
            .headers(headers)
            .send()
            .await
            .map_err(|e| ProxyError::Upstream(describe(&e, self.timeout, self.max_redirects)))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProxyError::Upstream(describe(&e, self.timeout, self.max_redirects)))?;

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// `scheme://host[:port]` of an absolute URL.
pub fn origin_of(target: &str) -> ProxyResult<String> {
    let url = Url::parse(target)
        .map_err(|e| ProxyError::Upstream(format!("Invalid URL '{}': {}", target, e)))?;
    match url.origin() {
        origin @ Origin::Tuple(..) => Ok(origin.ascii_serialization()),
        Origin::Opaque(_) => Err(ProxyError::Upstream(format!(
            "Invalid URL '{}': no origin",
            target
        ))),
    }
}

/// Human-readable cause for a transport failure.
fn describe(err: &reqwest::Error, timeout: Duration, max_redirects: usize) -> String {
    if err.is_timeout() {
        return format!("upstream request timed out after {}ms", timeout.as_millis());
    }
    if err.is_redirect() {
        return format!("too many redirects (limit {})", max_redirects);
    }

    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
