//! Transport seam and the reqwest-backed HTTP implementation.

use std::error::Error as _;
use std::future::Future;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tracing::{debug, info};

use super::AnalysisRequest;

/// MIME type sent for each archive part.
const ARCHIVE_MIME: &str = "application/zip";

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx, matching the browser's `Response.ok`.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("{0}")]
    Send(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Sends a built request and returns the raw response.
///
/// Implementations must not retry; one call is one request.
pub trait AnalysisTransport {
    fn post_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// reqwest implementation of [`AnalysisTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport. `None` leaves requests without a timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Client(describe(&e)))?;
        Ok(Self { client })
    }

    fn form(request: &AnalysisRequest) -> Result<Form, TransportError> {
        let mut form = Form::new();
        for part in &request.parts {
            let body = Part::bytes(part.file.bytes().to_vec())
                .file_name(part.file.file_name().to_string())
                .mime_str(ARCHIVE_MIME)
                .map_err(|e| TransportError::Client(describe(&e)))?;
            form = form.part(part.name(), body);
        }
        Ok(form)
    }
}

impl AnalysisTransport for HttpTransport {
    async fn post_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<RawResponse, TransportError> {
        let form = Self::form(request)?;

        info!(
            "POST {} ({} bytes in {} parts)",
            request.url,
            request.payload_len(),
            request.parts.len()
        );

        let response = self
            .client
            .post(request.url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Send(describe(&e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(describe(&e)))?;
        debug!("Response status {} with {} bytes", status, body.len());

        Ok(RawResponse::new(status, body.to_vec()))
    }
}

/// Flatten a reqwest error and its sources into one line.
///
/// The top-level message alone ("error sending request") hides the useful
/// part, e.g. "Connection refused".
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisParameters, ArchiveFile};
    use crate::request::ServiceEndpoint;
    use crate::test_support::{spawn_stub_server, zip_bytes};
    use tokio::net::TcpListener;

    fn request_for(base: &str) -> AnalysisRequest {
        let endpoint = ServiceEndpoint::parse(base).unwrap();
        let signal = ArchiveFile::from_bytes("signal.zip", zip_bytes(&[("s.csv", "t,b\n0,1\n")]));
        let noise = ArchiveFile::from_bytes("noise.zip", zip_bytes(&[("n.csv", "t,b\n0,2\n")]));
        AnalysisRequest::new(&endpoint, &AnalysisParameters::default(), &signal, &noise)
    }

    #[test]
    fn success_range_is_2xx() {
        assert!(RawResponse::new(200, "").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(302, "").is_success());
        assert!(!RawResponse::new(500, "").is_success());
    }

    #[tokio::test]
    async fn posts_multipart_to_analyze_endpoint() {
        let server = spawn_stub_server(200, "application/json", r#"{"timestamp":"t"}"#).await;
        let transport = HttpTransport::new(None).unwrap();

        let response = transport
            .post_analysis(&request_for(&server.base_url))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, br#"{"timestamp":"t"}"#.to_vec());

        let captured = server.captured().await;
        assert!(captured.starts_with("POST /analyze?target_freq=1028&bw=2&current=1"));
        assert!(captured.contains("multipart/form-data"));
        assert!(captured.contains(r#"name="signal_zip"; filename="signal.zip""#));
        assert!(captured.contains(r#"name="noise_zip"; filename="noise.zip""#));
        assert!(captured.contains("application/zip"));
    }

    #[tokio::test]
    async fn error_status_is_returned_not_raised() {
        let server = spawn_stub_server(500, "text/plain", "Internal Server Error").await;
        let transport = HttpTransport::new(None).unwrap();

        let response = transport
            .post_analysis(&request_for(&server.base_url))
            .await
            .unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.body, b"Internal Server Error".to_vec());
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(None).unwrap();
        let err = transport
            .post_analysis(&request_for(&format!("http://{}", addr)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Send(_)));
    }

    #[tokio::test]
    async fn configured_timeout_applies() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without answering
        let hold = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let transport = HttpTransport::new(Some(Duration::from_millis(200))).unwrap();
        let err = transport
            .post_analysis(&request_for(&format!("http://{}", addr)))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Send(_)));

        hold.abort();
    }
}
