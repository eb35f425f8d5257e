use std::collections::BTreeMap;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use toolgate_exec::engine::{
    redact_headers, render_data, HttpClient, HttpError, HttpRequestParts, HttpResponseParts,
    ReqwestHttpClient,
};

/// Serve one canned HTTP/1.1 response and return the raw request text.
async fn serve_once(status: &'static str, body: &'static str) -> (url::Url, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let mut read = 0;
        loop {
            let n = socket.read(&mut buf[read..]).await.unwrap();
            read += n;
            if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&buf[..read]).into_owned()
    });
    (url::Url::parse(&format!("http://{addr}/ping?x=1")).unwrap(), handle)
}

fn get(url: url::Url) -> HttpRequestParts {
    let mut headers = BTreeMap::new();
    headers.insert("x-api-key".to_string(), "k".to_string());
    HttpRequestParts {
        method: "GET".to_string(),
        url,
        headers,
        body: vec![],
    }
}

#[tokio::test]
async fn http_client_sends_request() {
    let (url, server) = serve_once("200 OK", r#"{"ok":true}"#).await;
    let client = ReqwestHttpClient::default();

    let resp = client
        .send(get(url), Duration::from_secs(5), 1024)
        .await
        .unwrap();

    assert!(resp.is_success());
    assert_eq!(resp.body, br#"{"ok":true}"#.to_vec());
    let raw = server.await.unwrap();
    assert!(raw.starts_with("GET /ping?x=1 HTTP/1.1"));
    assert!(raw.contains("x-api-key: k"));
}

#[tokio::test]
async fn http_client_enforces_response_size_limit() {
    let (url, _server) = serve_once("200 OK", "0123456789").await;
    let client = ReqwestHttpClient::default();

    let err = client
        .send(get(url), Duration::from_secs(5), 4)
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::ResponseTooLarge { max_bytes: 4 }));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn http_client_caps_chunked_body_without_length() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let _ = socket.read(&mut buf).await.unwrap();
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\nconnection: close\r\n\r\n")
            .await
            .unwrap();
        for _ in 0..4 {
            if socket.write_all(b"4\r\nabcd\r\n").await.is_err() {
                return;
            }
        }
        let _ = socket.write_all(b"0\r\n\r\n").await;
    });
    let client = ReqwestHttpClient::default();

    let err = client
        .send(
            get(url::Url::parse(&format!("http://{addr}/")).unwrap()),
            Duration::from_secs(5),
            10,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HttpError::ResponseTooLarge { max_bytes: 10 }), "{err:?}");
}

#[tokio::test]
async fn http_client_reports_refused_connection_as_transport() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = ReqwestHttpClient::default();

    let err = client
        .send(
            get(url::Url::parse(&format!("http://{addr}/")).unwrap()),
            Duration::from_secs(5),
            1024,
        )
        .await
        .unwrap_err();
    assert!(err.is_transport(), "{err:?}");
}

#[test]
fn status_line_includes_reason() {
    let resp = |status| HttpResponseParts {
        status,
        headers: BTreeMap::new(),
        body: vec![],
    };
    assert_eq!(resp(404).status_line(), "404 Not Found");
    assert_eq!(resp(599).status_line(), "599");
    assert!(!resp(302).is_success());
}

#[test]
fn sensitive_headers_are_masked() {
    let mut headers = BTreeMap::new();
    headers.insert("Authorization".to_string(), "Bearer t".to_string());
    headers.insert("x-api-key".to_string(), "k".to_string());
    headers.insert("accept".to_string(), "*/*".to_string());

    let redacted = redact_headers(&headers, &["x-api-key".to_string()]);
    assert_eq!(redacted["Authorization"], "<redacted>");
    assert_eq!(redacted["x-api-key"], "<redacted>");
    assert_eq!(redacted["accept"], "*/*");
}

#[test]
fn render_data_prefers_json() {
    assert_eq!(render_data(&serde_json::json!({ "a": [1, 2] })), r#"{"a":[1,2]}"#);

    let mut keyed = BTreeMap::new();
    keyed.insert((1, 2), "pair");
    let text = render_data(&keyed);
    assert!(!text.is_empty());
}
