//! HTTP client for API contract checks
//!
//! Thin JSON client over reqwest: base URL plus API prefix, fixed per-request timeout,
//! and transport errors folded into a small error type.

use anyhow::{Context, Result};
use reqwest::{header::CONTENT_TYPE, Client, Method};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// HTTP client errors
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Connection refused to {0}")]
    ConnectionRefused(String),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// HTTP client bound to one API base
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    api_prefix: String,
    timeout_secs: u64,
}

impl HttpClient {
    /// Create a client for `base_url` with the given per-request timeout
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_prefix: String::new(),
            timeout_secs,
        })
    }

    /// Set the path prefix put in front of every request path (e.g. `/api`)
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Base URL including the API prefix
    pub fn api_base(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
        .trim_end_matches('/')
        .to_string()
    }

    /// Build full URL
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.api_base(), path.trim_start_matches('/'))
    }

    /// Send one request; exactly one attempt, no retries
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = self.build_url(&request.path);
        debug!("Sending {} request to {}", request.method, url);

        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| HttpError::InvalidMethod(request.method.clone()))?;

        let mut req_builder = self.client.request(method, &url);

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        if let Some(body) = &request.body {
            req_builder = req_builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string());
        }

        let start = std::time::Instant::now();

        let response = req_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                HttpError::ConnectionRefused(url.clone())
            } else {
                HttpError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(self.timeout_secs)
            } else {
                HttpError::Body(e.to_string())
            }
        })?;

        debug!(
            "Response: {} {} in {}ms",
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            start.elapsed().as_millis()
        );

        Ok(HttpResponse {
            status_code: status.as_u16(),
            body,
        })
    }
}

/// HTTP request builder
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP response: status and raw body text
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
}

impl HttpResponse {
    /// Decode the body as JSON
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_request_builder() {
        let req = HttpRequest::new("GET", "/chat/history")
            .query("sessionId", "s1")
            .query("limit", 10);

        assert_eq!(req.method, "GET");
        assert_eq!(
            req.query,
            vec![
                ("sessionId".to_string(), "s1".to_string()),
                ("limit".to_string(), "10".to_string())
            ]
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn test_url_building() {
        let client = HttpClient::new("http://localhost:3000/", 10)
            .unwrap()
            .api_prefix("/api");
        assert_eq!(client.api_base(), "http://localhost:3000/api");
        assert_eq!(
            client.build_url("/auth/login"),
            "http://localhost:3000/api/auth/login"
        );
        assert_eq!(
            client.build_url("http://other:1/x"),
            "http://other:1/x"
        );
    }

    #[test]
    fn test_url_building_without_prefix() {
        let client = HttpClient::new("http://localhost:3000", 10).unwrap();
        assert_eq!(client.build_url("tutor"), "http://localhost:3000/tutor");
    }

    #[test]
    fn test_http_response_json() {
        let resp = HttpResponse {
            status_code: 200,
            body: r#"{"success":true}"#.to_string(),
        };
        assert_eq!(resp.json().unwrap(), json!({ "success": true }));

        let html = HttpResponse {
            status_code: 502,
            body: "<html>Bad Gateway</html>".to_string(),
        };
        assert!(html.json().is_err());
    }

    #[test]
    fn test_connection_refused_is_an_error_value() {
        // Port 9 (discard) is closed on test hosts; the error must come back as a value.
        let client = HttpClient::new("http://127.0.0.1:9", 2).unwrap();
        let result = tokio_test::block_on(client.send(&HttpRequest::new("GET", "/lessons")));
        assert!(result.is_err());
    }
}
