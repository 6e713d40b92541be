use std::collections::HashMap;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};

/// Body accepted by `POST /proxy`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ForwardRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty", default)]
    pub headers: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl ForwardRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Shape of every JSON error the proxy returns.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: Option<String>,
    pub usage: Option<String>,
}

pub struct ProxyClient {
    client: Client,
    proxy_url: String,
}

impl ProxyClient {
    pub fn new(proxy_url: &str) -> Self {
        Self {
            client: Client::builder()
                .no_proxy()
                .pool_max_idle_per_host(0)
                .build()
                .unwrap_or_default(),
            proxy_url: proxy_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the service descriptor from `/`.
    pub async fn describe(&self) -> Result<serde_json::Value, reqwest::Error> {
        self.client
            .get(format!("{}/", self.proxy_url))
            .send()
            .await?
            .json()
            .await
    }

    pub async fn health(&self) -> Result<Response, reqwest::Error> {
        self.client
            .get(format!("{}/health", self.proxy_url))
            .send()
            .await
    }

    /// Relay a GET through `/proxy?url=...`.
    pub async fn get(&self, target: &str) -> Result<Response, reqwest::Error> {
        self.client
            .get(format!("{}/proxy", self.proxy_url))
            .query(&[("url", target)])
            .send()
            .await
    }

    /// Relay an arbitrary request through `POST /proxy`.
    pub async fn forward(&self, req: &ForwardRequest) -> Result<Response, reqwest::Error> {
        self.client
            .post(format!("{}/proxy", self.proxy_url))
            .json(req)
            .send()
            .await
    }
}
