//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderName, Request};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tower::ServiceExt;

use games_api::config::AppConfig;
use games_api::games::{GameStore, MemoryStore};
use games_api::HttpServer;

/// Configuration that passes validation without touching the network.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.store.url = "http://127.0.0.1:9".to_string();
    config.store.api_key = "service-key".to_string();
    config.relay.connect_timeout_secs = 2;
    config.relay.upstream_timeout_secs = 5;
    config
}

pub fn app_with(config: AppConfig, store: Arc<dyn GameStore>) -> Router {
    HttpServer::new(config, store).unwrap().router()
}

/// Router backed by an empty in-memory store.
pub fn app() -> Router {
    app_with(test_config(), Arc::new(MemoryStore::new()))
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// `/api/proxy-image` request for `target`, URL-encoded.
pub fn proxy_request(target: &str) -> Request<Body> {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    Request::get(format!("/api/proxy-image?url={}", encoded))
        .body(Body::empty())
        .unwrap()
}

/// What a mock origin answers to every GET.
#[derive(Clone, Default)]
pub struct OriginReply {
    pub headers: Vec<(&'static str, String)>,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl OriginReply {
    pub fn image(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            headers: vec![
                ("Content-Type", content_type.to_string()),
                ("Content-Length", body.len().to_string()),
            ],
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A raw-TCP mock origin recording what it was sent.
pub struct Origin {
    pub addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    heads: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Origin {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// First bytes received on each connection.
    pub fn heads(&self) -> Vec<Vec<u8>> {
        self.heads.lock().unwrap().clone()
    }
}

/// Read a request head. Stops early when the peer is not speaking HTTP.
async fn read_head(socket: &mut TcpStream) -> Vec<u8> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        head.extend_from_slice(&buf[..n]);
        let looks_like_http = head.len() < 4 || head.starts_with(b"GET ");
        if !looks_like_http || head.windows(4).any(|w| w == b"\r\n\r\n") || head.len() > 8192 {
            break;
        }
    }
    head
}

/// Start an origin that answers every GET with `reply` and closes.
pub async fn start_origin(reply: OriginReply) -> Origin {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicUsize::new(0));
    let heads = Arc::new(Mutex::new(Vec::new()));

    let (conns, seen) = (connections.clone(), heads.clone());
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    conns.fetch_add(1, Ordering::SeqCst);
                    let reply = reply.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        let is_http = head.starts_with(b"GET ");
                        seen.lock().unwrap().push(head);
                        if !is_http {
                            return;
                        }

                        tokio::time::sleep(reply.delay).await;
                        let mut response = b"HTTP/1.1 200 OK\r\n".to_vec();
                        for (name, value) in &reply.headers {
                            let line = format!("{}: {}\r\n", name, value);
                            response.extend_from_slice(line.as_bytes());
                        }
                        response.extend_from_slice(b"Connection: close\r\n\r\n");
                        response.extend_from_slice(&reply.body);
                        let _ = socket.write_all(&response).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    Origin {
        addr,
        connections,
        heads,
    }
}

/// Start an origin that streams chunks until the peer goes away, then
/// reports the disconnect on the returned channel.
pub async fn start_endless_origin() -> (SocketAddr, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (closed_tx, closed_rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        read_head(&mut socket).await;

        let head: &[u8] = b"HTTP/1.1 200 OK\r\n\
            Content-Type: image/jpeg\r\n\
            Transfer-Encoding: chunked\r\n\r\n";
        if socket.write_all(head).await.is_err() {
            let _ = closed_tx.send(());
            return;
        }

        let mut chunk = b"400\r\n".to_vec();
        chunk.extend_from_slice(&[0xAB; 1024]);
        chunk.extend_from_slice(b"\r\n");
        loop {
            if socket.write_all(&chunk).await.is_err() {
                let _ = closed_tx.send(());
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    });

    (addr, closed_rx)
}

/// An address nothing is listening on.
pub async fn refused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Start an https origin serving `body` on every path.
///
/// Its certificate is issued by `fixture("ca.pem")` for `127.0.0.1` and
/// `localhost`. Every response also carries an `x-served-by` header.
pub async fn start_tls_origin(content_type: &'static str, body: Vec<u8>) -> SocketAddr {
    // Both ring and aws-lc may be compiled in; pick one for the server side.
    let _ = rustls::crypto::ring::default_provider().install_default();
    let tls = RustlsConfig::from_pem_file(fixture("origin.pem"), fixture("origin.key"))
        .await
        .unwrap();

    let app = Router::new().route(
        "/{*path}",
        get(move || {
            let body = body.clone();
            async move {
                (
                    [
                        (header::CONTENT_TYPE, content_type),
                        (HeaderName::from_static("x-served-by"), "tls-origin"),
                    ],
                    body,
                )
            }
        }),
    );

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum_server::from_tcp_rustls(listener, tls)
            .serve(app.into_make_service())
            .await;
    });

    addr
}
