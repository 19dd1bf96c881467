//! Error types for the analysis workflow.
//!
//! Every failure of a submission ends as an [`AnalysisError`] stored in the
//! lifecycle state. The `Display` text is what the user sees.

use thiserror::Error;

use crate::models::ParameterName;
use crate::request::TransportError;

/// Problems detected locally, before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or both archives are not selected.
    #[error("Please upload both Signal and Noise ZIP files.")]
    MissingArchives,

    /// A parameter is not a finite number.
    #[error("{} must be a number.", .name.label())]
    InvalidParameter { name: ParameterName },
}

/// Terminal failure of one submission.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Non-success response carrying a service message.
    #[error("{message}")]
    Service { status: u16, message: String },

    /// Non-success response without a usable message.
    #[error("HTTP error! status: {status}")]
    ServiceStatus { status: u16 },

    /// Success status but the body is not an analysis result.
    #[error("Malformed response from analysis service: {0}")]
    MalformedResponse(String),

    /// No response at all.
    #[error("Failed to reach analysis service: {0}")]
    Transport(String),
}

/// Coarse classification of [`AnalysisError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Service,
    ServiceUnparseable,
    Transport,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Validation(_) => ErrorKind::Validation,
            AnalysisError::Service { .. } => ErrorKind::Service,
            AnalysisError::ServiceStatus { .. } | AnalysisError::MalformedResponse(_) => {
                ErrorKind::ServiceUnparseable
            }
            AnalysisError::Transport(_) => ErrorKind::Transport,
        }
    }

    /// HTTP status, when the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            AnalysisError::Service { status, .. } | AnalysisError::ServiceStatus { status } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<TransportError> for AnalysisError {
    fn from(err: TransportError) -> Self {
        AnalysisError::Transport(err.to_string())
    }
}
