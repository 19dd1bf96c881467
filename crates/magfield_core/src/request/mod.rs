//! Request construction and dispatch for the analysis service.
//!
//! This module provides:
//! - `ServiceEndpoint`: a validated base URL for the service
//! - `AnalysisRequest`: the fully built POST (URL with query + archive parts)
//! - `AnalysisTransport`: the seam the workflow sends requests through
//! - `HttpTransport`: the reqwest implementation of that seam
//! - `classify`: mapping a raw HTTP response into a result or error

mod response;
mod transport;

pub use response::classify;
pub use transport::{AnalysisTransport, HttpTransport, RawResponse, TransportError};

use std::fmt;

use reqwest::Url;
use thiserror::Error;

use crate::models::{AnalysisParameters, ArchiveFile, FileRole};

/// Path segment of the analysis endpoint.
pub const ANALYZE_PATH: &str = "analyze";

/// Errors validating a service base URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Invalid service URL '{url}': {message}")]
    Invalid { url: String, message: String },

    #[error("Service URL '{0}' must use http or https")]
    UnsupportedScheme(String),
}

/// Base URL of the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    base: Url,
}

impl ServiceEndpoint {
    /// Parse and validate a base URL such as `http://127.0.0.1:8000`.
    pub fn parse(url: &str) -> Result<Self, EndpointError> {
        let base = Url::parse(url.trim()).map_err(|e| EndpointError::Invalid {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(EndpointError::UnsupportedScheme(url.to_string()));
        }

        Ok(Self { base })
    }

    /// `<base>/analyze?<parameters>`.
    ///
    /// Any path on the base URL is kept as a prefix; any query on it is dropped.
    pub fn analyze_url(&self, parameters: &AnalysisParameters) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(ANALYZE_PATH);
        }
        url.query_pairs_mut().extend_pairs(parameters.query_pairs());
        url
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}

/// One multipart part of the upload.
#[derive(Debug, Clone)]
pub struct ArchivePart {
    pub role: FileRole,
    pub file: ArchiveFile,
}

impl ArchivePart {
    pub fn name(&self) -> &'static str {
        self.role.part_name()
    }
}

/// A fully built analysis request.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub url: Url,
    pub parts: [ArchivePart; 2],
}

impl AnalysisRequest {
    pub fn new(
        endpoint: &ServiceEndpoint,
        parameters: &AnalysisParameters,
        signal: &ArchiveFile,
        noise: &ArchiveFile,
    ) -> Self {
        Self {
            url: endpoint.analyze_url(parameters),
            parts: [
                ArchivePart {
                    role: FileRole::Signal,
                    file: signal.clone(),
                },
                ArchivePart {
                    role: FileRole::Noise,
                    file: noise.clone(),
                },
            ],
        }
    }

    /// Encoded query string, without the leading `?`.
    pub fn query_string(&self) -> &str {
        self.url.query().unwrap_or("")
    }

    /// Total upload size in bytes.
    pub fn payload_len(&self) -> usize {
        self.parts.iter().map(|p| p.file.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn example_parameters() -> AnalysisParameters {
        AnalysisParameters {
            target_freq: 1028.0,
            bw: 2.0,
            current: 1.0,
            scaling: 1000.0,
            total_measurement_duration_sec: 30.0,
            interval_sec: 1.0,
        }
    }

    #[test]
    fn endpoint_rejects_non_http_urls() {
        assert!(ServiceEndpoint::parse("not a url").is_err());
        assert!(matches!(
            ServiceEndpoint::parse("ftp://example.com"),
            Err(EndpointError::UnsupportedScheme(_))
        ));
        assert!(ServiceEndpoint::parse("https://example.com/api").is_ok());
    }

    #[test]
    fn analyze_url_appends_path_to_base() {
        let params = example_parameters();

        let root = ServiceEndpoint::parse("http://127.0.0.1:8000").unwrap();
        assert_eq!(root.analyze_url(&params).path(), "/analyze");

        let prefixed = ServiceEndpoint::parse("https://lab.example/api/").unwrap();
        assert_eq!(prefixed.analyze_url(&params).path(), "/api/analyze");

        let no_slash = ServiceEndpoint::parse("https://lab.example/api?x=1").unwrap();
        let url = no_slash.analyze_url(&params);
        assert_eq!(url.path(), "/api/analyze");
        assert!(!url.query().unwrap().contains("x=1"));
    }

    #[test]
    fn query_string_carries_all_six_parameters() {
        let endpoint = ServiceEndpoint::parse("http://127.0.0.1:8000").unwrap();
        let url = endpoint.analyze_url(&example_parameters());

        let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let expected: HashMap<String, String> = [
            ("target_freq", "1028"),
            ("bw", "2"),
            ("current", "1"),
            ("scaling", "1000"),
            ("total_measurement_duration_sec", "30"),
            ("interval_sec", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(pairs, expected);
        assert_eq!(url.query().unwrap().split('&').count(), 6);
    }

    #[test]
    fn request_has_signal_then_noise_parts() {
        let endpoint = ServiceEndpoint::parse("http://127.0.0.1:8000").unwrap();
        let signal = ArchiveFile::from_bytes("s.zip", vec![1, 2, 3]);
        let noise = ArchiveFile::from_bytes("n.zip", vec![4, 5]);

        let request = AnalysisRequest::new(&endpoint, &example_parameters(), &signal, &noise);

        let names: Vec<_> = request.parts.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["signal_zip", "noise_zip"]);
        assert_eq!(request.parts[0].file.file_name(), "s.zip");
        assert_eq!(request.payload_len(), 5);
        assert!(request.query_string().starts_with("target_freq=1028&bw=2"));
    }
}
