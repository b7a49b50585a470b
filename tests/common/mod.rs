//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use azb_client::http::{HttpRequest, HttpResponse, Transport, TransportError};
use azb_client::storage::MemoryStore;
use azb_client::{ApiClient, ClientConfig};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Instant;

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(u16, Value),
    Text(u16, &'static str),
    Fail(TransportError),
    /// Fails after the given delay.
    Late(Duration, TransportError),
    /// Never answers; the caller's deadline decides.
    Hang,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Reply::Json(200, body)
    }

    pub fn refused() -> Self {
        Reply::Fail(TransportError::Connect("connection refused".into()))
    }
}

/// A request as the transport saw it.
#[derive(Debug, Clone)]
pub struct Sent {
    pub request: HttpRequest,
    pub at: Instant,
}

impl Sent {
    pub fn header(&self, name: &str) -> Option<String> {
        self.request
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

/// In-process transport: `/health` answers with `health`, everything else
/// pops the next API reply (the last one repeats).
pub struct ScriptedTransport {
    health: Mutex<Reply>,
    api: Mutex<VecDeque<Reply>>,
    sent: Mutex<Vec<Sent>>,
}

impl ScriptedTransport {
    pub fn new(health: Reply, api: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            health: Mutex::new(health),
            api: Mutex::new(api.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Healthy backend answering every API call with `reply`.
    pub fn healthy(api: Vec<Reply>) -> Arc<Self> {
        Self::new(Reply::ok(json!({ "status": "ok" })), api)
    }

    pub fn set_health(&self, reply: Reply) {
        *self.health.lock() = reply;
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn api_calls(&self) -> Vec<Sent> {
        self.sent
            .lock()
            .iter()
            .filter(|s| !s.request.url.ends_with("/health"))
            .cloned()
            .collect()
    }

    pub fn health_sent(&self) -> Vec<Sent> {
        self.sent
            .lock()
            .iter()
            .filter(|s| s.request.url.ends_with("/health"))
            .cloned()
            .collect()
    }

    pub fn health_calls(&self) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|s| s.request.url.ends_with("/health"))
            .count()
    }

    fn next_api(&self) -> Reply {
        let mut queue = self.api.lock();
        if queue.len() > 1 {
            queue.pop_front().unwrap_or_else(|| Reply::Text(500, "script exhausted"))
        } else {
            queue.front().cloned().unwrap_or_else(|| Reply::Text(500, "script exhausted"))
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let is_health = request.url.ends_with("/health");
        self.sent.lock().push(Sent {
            request,
            at: Instant::now(),
        });

        let reply = if is_health {
            self.health.lock().clone()
        } else {
            self.next_api()
        };

        match reply {
            Reply::Json(status, body) => Ok(HttpResponse {
                status,
                content_type: Some("application/json; charset=utf-8".into()),
                body: body.to_string(),
            }),
            Reply::Text(status, body) => Ok(HttpResponse {
                status,
                content_type: Some("text/plain".into()),
                body: body.to_string(),
            }),
            Reply::Fail(e) => Err(e),
            Reply::Late(delay, e) => {
                tokio::time::sleep(delay).await;
                Err(e)
            }
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Err(TransportError::Network("hang ended".into()))
            }
        }
    }
}

/// Client over a scripted transport with in-memory session storage.
pub fn client(transport: Arc<ScriptedTransport>) -> ApiClient {
    client_with(transport, ClientConfig::default())
}

pub fn client_with(transport: Arc<ScriptedTransport>, config: ClientConfig) -> ApiClient {
    ApiClient::builder()
        .config(config)
        .transport(transport)
        .storage(Arc::new(MemoryStore::new()))
        .build()
        .unwrap()
}

/// A JWT whose `exp` lies `secs` from now (negative for the past).
pub fn token_expiring_in(secs: i64) -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    make_token(json!({ "sub": "user-1", "exp": now + secs }))
}

pub fn make_token(payload: Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.c2lnbmF0dXJl", header, body)
}

/// Start a programmable backend on an ephemeral port. Every connection gets
/// one response produced by `f`.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut buf = vec![0u8; 8192];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let head = String::from_utf8_lossy(&buf[..n]).to_string();
                        let path = head
                            .lines()
                            .next()
                            .and_then(|line| line.split_whitespace().nth(1))
                            .unwrap_or("/")
                            .to_string();

                        let (status, body) = f(path).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            401 => "401 Unauthorized",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
