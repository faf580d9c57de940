#![allow(dead_code)]

use cors_file_server::{Config, Server, ServerError};
use std::net::SocketAddr;
use std::path::Path;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const NO_CACHE: &str = "no-store, no-cache, must-revalidate";

/// A server running on a loopback port over a temporary root directory
pub struct TestServer {
    pub root: TempDir,
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<(), ServerError>>>,
}

impl TestServer {
    /// Start a server; `setup` populates the root directory first
    pub async fn start(setup: impl FnOnce(&Path)) -> Self {
        Self::start_with(setup, |_| {}).await
    }

    /// Like [`TestServer::start`], with `configure` adjusting the config
    pub async fn start_with(setup: impl FnOnce(&Path), configure: impl FnOnce(&mut Config)) -> Self {
        let root = TempDir::new().expect("create temp root");
        setup(root.path());

        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.server.root = Some(root.path().to_string_lossy().into_owned());
        config.logging.access_log = false;
        configure(&mut config);

        let server = Server::bind(&config).expect("bind test server");
        let addr = server.local_addr().expect("local addr");

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve(async move {
            let _ = rx.await;
        }));

        Self {
            root,
            addr,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    /// Fire the shutdown signal and wait for `serve` to return
    pub async fn stop(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle
            .take()
            .expect("server task")
            .await
            .expect("server task panicked")
    }

    pub async fn get(&self, path: &str) -> RawResponse {
        self.request("GET", path, &[]).await
    }

    pub async fn request(&self, method: &str, path: &str, headers: &[(&str, &str)]) -> RawResponse {
        send_raw(self.addr, method, path, headers).await
    }
}

/// Parsed HTTP/1.1 response
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// First value of a header, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn header_count(&self, name: &str) -> usize {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .count()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The four headers every response must carry
    pub fn assert_augmented(&self) {
        assert_eq!(self.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(self.header("Access-Control-Allow-Methods"), Some("GET"));
        assert_eq!(self.header("Access-Control-Allow-Headers"), Some("Content-Type"));
        assert_eq!(self.header("Cache-Control"), Some(NO_CACHE));
        assert_eq!(self.header_count("Cache-Control"), 1);
    }
}

/// Send one request with `Connection: close` and read the whole response
pub async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.expect("connect");

    let mut request = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (name, value) in headers {
        request.push_str(&format!("{name}: {value}\r\n"));
    }
    request.push_str("\r\n");
    stream.write_all(request.as_bytes()).await.expect("write request");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read response");
    parse_response(&raw)
}

fn parse_response(raw: &[u8]) -> RawResponse {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("end of response head");
    let head = std::str::from_utf8(&raw[..split]).expect("utf-8 head");
    let body = raw[split + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status_line = lines.next().expect("status line");
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .expect("status code");

    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();

    RawResponse {
        status,
        headers,
        body,
    }
}
