//! Network transport seam.
//!
//! # Responsibilities
//! - Send one fully resolved request and buffer the response body
//! - Classify transport failures (timeout, connect, abort)
//!
//! The orchestrator only talks to [`Transport`]; `ReqwestTransport` is the
//! production implementation and tests inject scripted ones.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method};
use thiserror::Error;

/// Failures below the HTTP layer.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Deadline elapsed before the response arrived (milliseconds).
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Connection could not be established (DNS, refused, TLS).
    #[error("Failed to fetch: {0}")]
    Connect(String),

    /// Request was aborted mid-flight.
    #[error("Request aborted: {0}")]
    Aborted(String),

    /// Any other network error, including failing to read the body.
    #[error("NetworkError: {0}")]
    Network(String),

    /// The request itself is malformed (bad URL, bad header).
    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl TransportError {
    /// Failures a cold or flaky backend can cause, and so worth retrying.
    pub fn is_network(&self) -> bool {
        !matches!(self, TransportError::Invalid(_))
    }

    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(timeout.as_millis() as u64)
        } else if err.is_builder() {
            TransportError::Invalid(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// A request ready for the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub timeout: Duration,
}

/// A buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests over the network.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout;
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .timeout(timeout);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(e, timeout))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(e, timeout))?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn get(url: String, timeout: Duration) -> HttpRequest {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/json".parse().unwrap());
        HttpRequest {
            method: Method::GET,
            url,
            headers,
            body: None,
            timeout,
        }
    }

    #[tokio::test]
    async fn test_reqwest_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/items"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new();
        let response = transport
            .send(get(format!("{}/api/items", server.uri()), Duration::from_secs(5)))
            .await
            .unwrap();

        assert!(response.is_success());
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
        assert_eq!(response.body, r#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_reqwest_timeout_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new();
        let err = transport
            .send(get(format!("{}/slow", server.uri()), Duration::from_millis(50)))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Timeout(50)));
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = ReqwestTransport::new();
        let err = transport
            .send(get(format!("http://{}/health", addr), Duration::from_secs(2)))
            .await
            .unwrap_err();

        assert!(err.is_network());
    }

    #[test]
    fn test_invalid_is_not_network() {
        assert!(!TransportError::Invalid("bad header".into()).is_network());
        assert!(TransportError::Connect("refused".into()).is_network());
    }
}
