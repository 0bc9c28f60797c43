use revend_voucher::{HttpVoucherClient, VoucherError, VoucherService};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time::Duration;

/// Serve exactly one HTTP response and report the request line that was received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept failed");
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.expect("read failed");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let request = String::from_utf8_lossy(&request);
        let request_line = request.lines().next().unwrap_or_default().to_string();
        let _ = tx.send(request_line);

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.expect("write failed");
        socket.shutdown().await.ok();
    });

    (format!("http://{}/addvoucher", addr), rx)
}

fn client(endpoint: &str) -> HttpVoucherClient {
    HttpVoucherClient::new(endpoint, Duration::from_secs(5)).expect("client build failed")
}

#[tokio::test]
async fn test_issue_voucher_sends_seconds_query() {
    let (endpoint, request) = serve_once("200 OK", r#"{"voucherCode":"ABC123"}"#).await;

    let code = client(&endpoint).issue_voucher(600).await.expect("voucher failed");
    assert_eq!(code, "ABC123");

    let request_line = request.await.unwrap();
    assert_eq!(request_line, "GET /addvoucher?seconds=600 HTTP/1.1");
}

#[tokio::test]
async fn test_missing_code_is_failure() {
    let (endpoint, _request) = serve_once("200 OK", "{}").await;

    let result = client(&endpoint).issue_voucher(300).await;
    assert!(matches!(result, Err(VoucherError::MissingCode)));
}

#[tokio::test]
async fn test_non_success_status_is_failure() {
    let (endpoint, _request) = serve_once("503 Service Unavailable", r#"{"voucherCode":"LATE"}"#).await;

    match client(&endpoint).issue_voucher(300).await {
        Err(VoucherError::Status(503)) => {}
        other => panic!("expected Status(503), got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_body_is_failure() {
    let (endpoint, _request) = serve_once("200 OK", "voucher: ABC").await;

    let result = client(&endpoint).issue_voucher(300).await;
    assert!(matches!(result, Err(VoucherError::Decode(_))));
}

#[tokio::test]
async fn test_connection_refused_is_failure() {
    // bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = client(&format!("http://{}/addvoucher", addr)).issue_voucher(300).await;
    assert!(matches!(result, Err(VoucherError::Http(_))));
}

#[tokio::test]
async fn test_unresponsive_service_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // accept and hold the connection open without answering
        let (_socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(30)).await;
    });

    let client = HttpVoucherClient::new(format!("http://{}/addvoucher", addr), Duration::from_millis(200)).unwrap();
    let result = client.issue_voucher(300).await;
    assert!(matches!(result, Err(VoucherError::Http(_))));
}
