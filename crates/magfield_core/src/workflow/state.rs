//! Request lifecycle state and the overlap policy.

use serde::{Deserialize, Serialize};

use super::AnalysisError;
use crate::models::AnalysisResult;

/// Phase of the most recent submission.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A request is outstanding.
    Submitting,
    /// The last applied response was a result.
    Succeeded(AnalysisResult),
    /// The last attempt failed.
    ///
    /// `retained` is the result that stays on screen underneath the error.
    /// Only local validation failures keep one.
    Failed {
        error: AnalysisError,
        retained: Option<AnalysisResult>,
    },
}

impl RequestState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, RequestState::Submitting)
    }

    /// `Succeeded` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Succeeded(_) | RequestState::Failed { .. })
    }

    /// Result to render, including one retained under an error.
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            RequestState::Succeeded(result) => Some(result),
            RequestState::Failed { retained, .. } => retained.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            RequestState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// What happens when a submission starts while another is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Every response is applied in arrival order; the last one to arrive wins.
    #[default]
    LastResponseWins,
    /// Responses to superseded submissions are discarded.
    LatestRequestWins,
    /// A new submission is refused while one is outstanding.
    RejectWhileSubmitting,
}
