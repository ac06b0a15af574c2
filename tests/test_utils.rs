#![allow(dead_code)]

use design_lens::ImageFile;
use design_lens::image::MAX_FILE_SIZE;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A request received by [`StubServer`]
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

/// Loopback HTTP server that answers every request with one canned response
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start(status: u16, body: impl Into<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let addr = listener.local_addr().expect("Failed to read local address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let body = body.into();

        let captured = Arc::clone(&requests);
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                if let Some(request) = serve(stream, status, &body).await {
                    captured.lock().push(request);
                }
            }
        });

        Self {
            addr,
            requests,
            handle,
        }
    }

    /// Answer with a JSON envelope
    pub async fn json(status: u16, body: &Value) -> Self {
        Self::start(status, body.to_string()).await
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(mut stream: TcpStream, status: u16, body: &str) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0_u8; 8192];

    let header_end = loop {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n").filter(|line| !line.is_empty());
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..read]);
    }
    let request_body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    let response = format!(
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;

    Some(CapturedRequest {
        method,
        target,
        headers,
        body: request_body,
    })
}

/// A well-formed diagnosis answer with dimension scores 70, 75, 62, 68, 80
pub fn diagnosis_json(overall: u8) -> Value {
    let dimension = |score: u8, issue: &str| {
        json!({
            "score": score,
            "issues": [issue],
            "suggestions": ["Tighten the spacing scale"]
        })
    };
    json!({
        "overallScore": overall,
        "dimensions": {
            "color": dimension(70, "Low contrast on secondary buttons"),
            "layout": dimension(75, "Uneven gutters"),
            "typography": dimension(62, "Too many font weights"),
            "hierarchy": dimension(68, "Two competing focal points"),
            "branding": dimension(80, "Logo clear space is too tight")
        }
    })
}

/// The diagnosis wrapped in a Markdown code fence
pub fn fenced(value: &Value) -> String {
    format!("```json\n{}\n```", serde_json::to_string_pretty(value).expect("serializes"))
}

pub fn png_file() -> ImageFile {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&[0_u8; 64]);
    ImageFile::from_bytes("landing.png", bytes, MAX_FILE_SIZE).expect("Failed to build PNG fixture")
}

pub fn pdf_file() -> ImageFile {
    ImageFile::from_bytes("brochure.pdf", b"%PDF-1.7\n%stub".to_vec(), MAX_FILE_SIZE)
        .expect("Failed to build PDF fixture")
}
