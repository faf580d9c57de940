mod common;

use common::TestServer;
use std::fs;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn site(root: &std::path::Path) {
    fs::write(root.join("index.html"), "<h1>hi</h1>").unwrap();
    fs::write(root.join("data.json"), r#"{"ok":true}"#).unwrap();
    fs::create_dir(root.join("assets")).unwrap();
    fs::write(root.join("assets/app.js"), "console.log('hi');").unwrap();
    fs::write(root.join("assets/my file.txt"), "spaced").unwrap();
}

#[tokio::test]
async fn test_get_index_html() {
    let server = TestServer::start(site).await;

    let resp = server.get("/index.html").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body_text(), "<h1>hi</h1>");
    assert_eq!(resp.header("Content-Type"), Some("text/html; charset=utf-8"));
    assert_eq!(resp.header("Content-Length"), Some("11"));
    assert!(resp.header("Last-Modified").is_some());
    resp.assert_augmented();

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_missing_file_is_404_with_headers() {
    let server = TestServer::start(site).await;

    let resp = server.get("/does-not-exist.txt").await;
    assert_eq!(resp.status, 404);
    assert!(resp.body_text().contains("File not found"));
    resp.assert_augmented();

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_root_serves_index() {
    let server = TestServer::start(site).await;

    let resp = server.get("/").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body_text(), "<h1>hi</h1>");
    resp.assert_augmented();

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_directory_redirect_and_listing() {
    let server = TestServer::start(site).await;

    let resp = server.get("/assets").await;
    assert_eq!(resp.status, 301);
    assert_eq!(resp.header("Location"), Some("/assets/"));
    resp.assert_augmented();

    let resp = server.get("/assets/").await;
    assert_eq!(resp.status, 200);
    let body = resp.body_text();
    assert!(body.contains("Directory listing for /assets/"));
    assert!(body.contains("<a href=\"app.js\">app.js</a>"));
    assert!(body.contains("<a href=\"my%20file.txt\">my file.txt</a>"));
    resp.assert_augmented();

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_redirect_never_leaves_origin() {
    let server = TestServer::start(site).await;

    for path in ["//evil.example/..", "//evil.example/%2e%2e", "///assets"] {
        let resp = server.get(path).await;
        assert_eq!(resp.status, 301, "{path}");
        let location = resp.header("Location").unwrap();
        assert!(location.starts_with('/'), "{path} -> {location}");
        assert!(!location.starts_with("//"), "{path} -> {location}");
        resp.assert_augmented();
    }
    assert_eq!(server.get("///assets").await.header("Location"), Some("/assets/"));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_percent_encoded_path_and_query() {
    let server = TestServer::start(site).await;

    let resp = server.get("/assets/my%20file.txt?cachebust=123").await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body_text(), "spaced");
    assert_eq!(resp.header("Content-Type"), Some("text/plain; charset=utf-8"));

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_origin_header_is_not_reflected() {
    let server = TestServer::start(site).await;

    let resp = server
        .request("GET", "/data.json", &[("Origin", "https://app.example.com")])
        .await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("Content-Type"), Some("application/json"));
    resp.assert_augmented();

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_head_returns_headers_only() {
    let server = TestServer::start(site).await;

    let resp = server.request("HEAD", "/index.html", &[]).await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.header("Content-Length"), Some("11"));
    assert!(resp.body.is_empty());
    resp.assert_augmented();

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_unsupported_methods_get_501_with_headers() {
    let server = TestServer::start(site).await;

    for method in ["POST", "PUT", "DELETE", "OPTIONS"] {
        let resp = server.request(method, "/index.html", &[("Content-Length", "0")]).await;
        assert_eq!(resp.status, 501, "{method}");
        assert!(resp.body_text().contains(&format!("Unsupported method ('{method}')")));
        resp.assert_augmented();
    }

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_conditional_get_returns_304_with_headers() {
    let server = TestServer::start(site).await;

    let resp = server
        .request(
            "GET",
            "/index.html",
            &[("If-Modified-Since", "Fri, 31 Dec 9999 23:59:59 GMT")],
        )
        .await;
    assert_eq!(resp.status, 304);
    assert!(resp.body.is_empty());
    resp.assert_augmented();

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_path_traversal_stays_in_root() {
    let outside = tempfile::tempdir().unwrap();
    fs::write(outside.path().join("secret.txt"), "top secret").unwrap();

    let server = TestServer::start(site).await;
    let name = outside.path().file_name().unwrap().to_string_lossy().into_owned();

    let resp = server.get(&format!("/../{name}/secret.txt")).await;
    assert_eq!(resp.status, 404);
    let resp = server.get(&format!("/%2e%2e/{name}/secret.txt")).await;
    assert_eq!(resp.status, 404);
    resp.assert_augmented();

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_slow_reader_receives_whole_file() {
    const SIZE: usize = 16 * 1024 * 1024;
    let server = TestServer::start_with(
        |root| fs::write(root.join("big.bin"), vec![7u8; SIZE]).unwrap(),
        |config| config.performance.header_read_timeout = 1,
    )
    .await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    let request = format!(
        "GET /big.bin HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        server.addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    // stall well past the header timeout while the server is mid-body
    tokio::time::sleep(Duration::from_millis(2500)).await;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let head_end = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
    let head = String::from_utf8_lossy(&raw[..head_end]).into_owned();
    assert!(head.starts_with("HTTP/1.1 200"));
    assert!(head.contains(&format!("content-length: {SIZE}")));
    assert_eq!(raw.len() - head_end, SIZE);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_files_are_read_fresh_on_every_request() {
    let server = TestServer::start(site).await;

    assert_eq!(server.get("/data.json").await.body_text(), r#"{"ok":true}"#);
    fs::write(server.root.path().join("data.json"), r#"{"ok":false}"#).unwrap();
    assert_eq!(server.get("/data.json").await.body_text(), r#"{"ok":false}"#);

    server.stop().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let server = TestServer::start(site).await;
    let addr = server.addr;

    server.stop().await.unwrap();

    // listener is dropped once serve returns
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_second_server_on_same_port_fails_to_bind() {
    let server = TestServer::start(site).await;

    let mut config = cors_file_server::Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = server.addr.port();
    config.server.root = Some(server.root.path().to_string_lossy().into_owned());

    let err = cors_file_server::Server::bind(&config).unwrap_err();
    assert!(err.is_addr_in_use(), "unexpected error: {err}");

    server.stop().await.unwrap();
}
