use std::net::{IpAddr, Ipv4Addr};

use serde_json::json;
use service_handle::{InvokeErrorKind, ServiceHandle};
use service_handle_http::{HttpService, HttpServiceConfig, ServiceManifest};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn allow_local_integration() -> bool {
    std::env::var("RPCSH_ALLOW_LOCAL_INTEGRATION")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false)
}

/// Answers exactly one request with a canned response and hands back the raw
/// request text.
async fn serve_once(status: u16, reason: &str, body: &str) -> (u16, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("local TCP listener should bind");
    let port = listener
        .local_addr()
        .expect("resolved local listener address")
        .port();
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut request = Vec::new();
        let mut buffer = [0_u8; 2048];
        loop {
            let n = socket.read(&mut buffer).await.expect("read request");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buffer[..n]);
            if let Some(split) = request.windows(4).position(|window| window == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&request[..split]).to_ascii_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if request.len() >= split + 4 + length {
                    break;
                }
            }
        }
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&request).into_owned()
    });

    (port, handle)
}

fn echo_service(port: u16) -> HttpService {
    let manifest: ServiceManifest = serde_json::from_value(json!({
        "package": "demo",
        "services": [{"name": "Echo", "methods": [{"name": "Echo", "request": "Req", "response": "Resp"}]}]
    }))
    .expect("manifest should parse");
    let config = HttpServiceConfig::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port).insecure();
    HttpService::new(config, &manifest, None).expect("service")
}

#[tokio::test]
async fn invoke_returns_json_body_on_success() {
    if !allow_local_integration() {
        return;
    }

    let (port, server) = serve_once(200, "OK", r#"{"msg":"hi"}"#).await;
    let service = echo_service(port);

    let value = service
        .invoke("Echo", json!({"msg": "hi"}))
        .await
        .expect("invoke should succeed");
    assert_eq!(value, json!({"msg": "hi"}));

    let request = server.await.expect("server task");
    assert!(request.starts_with("POST /demo.Echo/Echo HTTP/1.1"));
    assert!(request.ends_with(r#"{"msg":"hi"}"#));
}

#[tokio::test]
async fn invoke_maps_error_status_to_status_error() {
    if !allow_local_integration() {
        return;
    }

    let (port, server) = serve_once(404, "Not Found", r#"{"error":{"message":"no such method"}}"#).await;
    let service = echo_service(port);

    let error = service
        .invoke("Echo", json!({}))
        .await
        .expect_err("404 must fail");
    assert_eq!(error.kind(), InvokeErrorKind::Status);
    assert_eq!(error.message(), "HTTP 404 Not Found: no such method");
    let _ = server.await;
}

#[tokio::test]
async fn invoke_reports_transport_error_when_nothing_listens() {
    if !allow_local_integration() {
        return;
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let error = echo_service(port)
        .invoke("Echo", json!({}))
        .await
        .expect_err("connection refused must fail");
    assert_eq!(error.kind(), InvokeErrorKind::Transport);
}
