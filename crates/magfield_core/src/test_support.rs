//! Fixtures shared by unit tests across modules.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;

/// Build a zip in memory with the given (name, contents) members.
pub(crate) fn zip_bytes(members: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in members {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A one-shot HTTP server that answers a single request with a canned response.
pub(crate) struct StubServer {
    pub base_url: String,
    request: tokio::sync::oneshot::Receiver<String>,
}

impl StubServer {
    /// The raw request the server received (headers and body, lossy UTF-8).
    pub async fn captured(self) -> String {
        self.request.await.unwrap()
    }
}

pub(crate) async fn spawn_stub_server(status: u16, content_type: &str, body: &str) -> StubServer {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = tokio::sync::oneshot::channel();

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            if request_complete(&raw) {
                break;
            }
        }

        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send(String::from_utf8_lossy(&raw).to_string());
    });

    StubServer {
        base_url,
        request: rx,
    }
}

/// Whether `raw` holds a full HTTP/1.1 request (headers plus body).
fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let headers = text[..header_end].to_ascii_lowercase();
    let body_len = raw.len() - (header_end + 4);

    if headers.contains("transfer-encoding: chunked") {
        return text.ends_with("0\r\n\r\n");
    }

    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    body_len >= content_length
}
