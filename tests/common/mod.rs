//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use axum::body::Body;
use axum::http::Request;

#[allow(dead_code)]
pub const CIS_NS: &str = "http://cbcm.pull.cis.sem/";

/// A populated `getSubscriptionDtlsResponse` wrapped in a SOAP envelope.
#[allow(dead_code)]
pub const SUBSCRIPTION_REPLY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <ns2:getSubscriptionDtlsResponse xmlns:ns2="http://cbcm.pull.cis.sem/">
      <requestId>REQ-1</requestId>
      <status>SUCCESS</status>
      <message>Subscriptions found</message>
      <timestamp>2024-05-01T10:15:30Z</timestamp>
      <serviceInfoList>
        <serviceId>SVC-001</serviceId>
        <serviceName>Mobile Postpaid</serviceName>
        <serviceStatus>ACTIVE</serviceStatus>
        <description>Unlimited plan</description>
      </serviceInfoList>
      <serviceInfoList>
        <serviceId>SVC-002</serviceId>
        <serviceName>Roaming</serviceName>
        <serviceStatus>SUSPENDED</serviceStatus>
      </serviceInfoList>
    </ns2:getSubscriptionDtlsResponse>
  </soap:Body>
</soap:Envelope>"#;

#[allow(dead_code)]
pub const FAULT_REPLY: &str = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <soap:Fault>
      <faultcode>soap:Server</faultcode>
      <faultstring>Customer not found</faultstring>
      <detail><errorCode>CIS-404</errorCode></detail>
    </soap:Fault>
  </soap:Body>
</soap:Envelope>"#;

/// A mock SOAP endpoint answering every request with one canned reply.
pub struct MockSoapBackend {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl MockSoapBackend {
    pub fn url(&self) -> String {
        format!("http://{}/soap/cis", self.addr)
    }

    /// Raw HTTP requests received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a mock SOAP backend on an ephemeral port.
#[allow(dead_code)]
pub async fn start_soap_backend(status: u16, body: &'static str) -> MockSoapBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        recorded.lock().unwrap().push(request);

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: text/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line(status),
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

    MockSoapBackend { addr, requests }
}

fn status_line(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Read one HTTP request: headers, then `content-length` bytes of body.
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// A JSON `POST /api/cis/pull` request.
#[allow(dead_code)]
pub fn pull_request(json: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/cis/pull")
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
