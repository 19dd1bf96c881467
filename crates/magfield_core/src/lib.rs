//! Magnetic Field Analyzer Core - request workflow for the remote analysis service
//!
//! This crate contains all client logic with zero UI dependencies.
//! A front end owns one [`AnalysisWorkflow`], feeds it parameter and file
//! edits, submits, and renders whatever [`AnalysisWorkflow::view`] exposes.

pub mod config;
pub mod logging;
pub mod models;
pub mod request;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use models::{AnalysisParameters, AnalysisResult, ArchiveFile, FileRole, ParameterName};
pub use request::{AnalysisTransport, HttpTransport, ServiceEndpoint};
pub use workflow::{AnalysisError, AnalysisWorkflow, OverlapPolicy, RequestState};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
