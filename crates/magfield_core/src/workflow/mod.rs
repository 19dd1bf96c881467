//! The analysis request workflow.
//!
//! One [`AnalysisWorkflow`] owns the form state (parameters and archives) and
//! the lifecycle of submissions against the analysis service:
//!
//! ```text
//! Idle ──submit──▶ Submitting ──response──▶ Succeeded(result)
//!   ▲                  │                         │
//!   │                  └──error──▶ Failed ◀──────┘ (next submit)
//! ```
//!
//! A submission runs in three stages so an event loop can keep other work
//! going while the request is in flight:
//!
//! 1. [`AnalysisWorkflow::begin_submit`] validates synchronously and builds
//!    the request, moving to `Submitting`.
//! 2. [`Submission::send`] awaits the transport and classifies the response.
//!    It does not touch the workflow.
//! 3. [`AnalysisWorkflow::finish`] applies the outcome.
//!
//! [`AnalysisWorkflow::submit`] runs all three in sequence.

mod errors;
mod state;
mod view;

pub use errors::{AnalysisError, ErrorKind, ValidationError};
pub use state::{OverlapPolicy, RequestState};
pub use view::{FileView, PlotKind, PlotPanel, ResultView, WorkflowView};

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{
    AnalysisParameters, AnalysisResult, ArchiveFile, FileRole, FileSelection, ParameterName,
};
use crate::request::{classify, AnalysisRequest, AnalysisTransport, ServiceEndpoint};

/// Why [`AnalysisWorkflow::begin_submit`] did not produce a request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    /// Validation failed; the workflow is now `Failed` with this error.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Refused under [`OverlapPolicy::RejectWhileSubmitting`]; state unchanged.
    #[error("An analysis request is already in progress")]
    AlreadySubmitting,
}

/// Tickets of submissions that are begun and not yet finished or dropped.
type Outstanding = Arc<Mutex<BTreeSet<u64>>>;

fn lock(outstanding: &Outstanding) -> MutexGuard<'_, BTreeSet<u64>> {
    outstanding.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keeps a ticket outstanding for as long as it lives.
#[derive(Debug)]
struct TicketGuard {
    ticket: u64,
    outstanding: Outstanding,
}

impl Drop for TicketGuard {
    fn drop(&mut self) {
        if lock(&self.outstanding).remove(&self.ticket) {
            debug!("Analysis #{} no longer outstanding", self.ticket);
        }
    }
}

/// A request that has been validated and built, ready to send.
///
/// Dropping it, or the future returned by [`Submission::send`], releases the
/// ticket as if the request had never been made.
#[derive(Debug)]
pub struct Submission {
    guard: TicketGuard,
    request: AnalysisRequest,
}

impl Submission {
    pub fn ticket(&self) -> u64 {
        self.guard.ticket
    }

    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    /// Send the request once and classify the outcome.
    ///
    /// Never fails: transport problems and bad responses become the
    /// completion's error.
    pub async fn send<T: AnalysisTransport>(self, transport: &T) -> Completion {
        let outcome = match transport.post_analysis(&self.request).await {
            Ok(response) => classify(response),
            Err(e) => Err(AnalysisError::from(e)),
        };
        Completion {
            guard: self.guard,
            outcome,
        }
    }
}

/// The outcome of one sent submission.
#[derive(Debug)]
pub struct Completion {
    guard: TicketGuard,
    outcome: Result<AnalysisResult, AnalysisError>,
}

impl Completion {
    pub fn ticket(&self) -> u64 {
        self.guard.ticket
    }

    pub fn outcome(&self) -> &Result<AnalysisResult, AnalysisError> {
        &self.outcome
    }
}

/// Form state plus submission lifecycle.
#[derive(Debug)]
pub struct AnalysisWorkflow {
    endpoint: ServiceEndpoint,
    policy: OverlapPolicy,
    parameters: AnalysisParameters,
    files: FileSelection,
    state: RequestState,
    /// Ticket handed to the next submission.
    next_ticket: u64,
    /// Highest ticket whose completion was applied; 0 before the first.
    last_applied: u64,
    outstanding: Outstanding,
}

impl AnalysisWorkflow {
    pub fn new(endpoint: ServiceEndpoint, parameters: AnalysisParameters) -> Self {
        Self {
            endpoint,
            policy: OverlapPolicy::default(),
            parameters,
            files: FileSelection::default(),
            state: RequestState::Idle,
            next_ticket: 1,
            last_applied: 0,
            outstanding: Outstanding::default(),
        }
    }

    pub fn with_policy(mut self, policy: OverlapPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn endpoint(&self) -> &ServiceEndpoint {
        &self.endpoint
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    pub fn parameters(&self) -> &AnalysisParameters {
        &self.parameters
    }

    pub fn files(&self) -> &FileSelection {
        &self.files
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Number of submissions begun and not yet finished or dropped.
    pub fn in_flight(&self) -> usize {
        lock(&self.outstanding).len()
    }

    pub fn set_parameter(&mut self, name: ParameterName, value: f64) {
        self.parameters.set(name, value);
    }

    /// Set a parameter from raw text; unparseable text is accepted for now.
    pub fn set_parameter_text(&mut self, name: ParameterName, text: &str) {
        self.parameters.set_text(name, text);
    }

    pub fn set_file(&mut self, role: FileRole, file: ArchiveFile) {
        debug!("{} archive set to '{}' ({} bytes)", role, file.file_name(), file.len());
        self.files.set(role, file);
    }

    pub fn clear_file(&mut self, role: FileRole) {
        self.files.clear(role);
    }

    /// Validate and build a request, moving to `Submitting`.
    ///
    /// On a validation error the workflow moves to `Failed` and keeps the
    /// result currently on screen; no request is built.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitError> {
        let in_flight = self.in_flight();
        if self.policy == OverlapPolicy::RejectWhileSubmitting && in_flight > 0 {
            debug!("Submit refused: {} request(s) outstanding", in_flight);
            return Err(SubmitError::AlreadySubmitting);
        }

        if let Err(error) = self.validate() {
            warn!("Submit rejected: {}", error);
            let retained = self.state.result().cloned();
            self.state = RequestState::Failed {
                error: error.clone().into(),
                retained,
            };
            return Err(SubmitError::Invalid(error));
        }

        let Some((signal, noise)) = self.files.pair() else {
            // validate() checked both archives are present
            return Err(SubmitError::Invalid(ValidationError::MissingArchives));
        };
        let request = AnalysisRequest::new(&self.endpoint, &self.parameters, signal, noise);

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        lock(&self.outstanding).insert(ticket);
        let guard = TicketGuard {
            ticket,
            outstanding: Arc::clone(&self.outstanding),
        };
        self.state = RequestState::Submitting;

        info!(
            "Submitting analysis #{}: signal='{}', noise='{}', {}",
            ticket,
            signal.file_name(),
            noise.file_name(),
            request.query_string()
        );

        Ok(Submission { guard, request })
    }

    /// Apply a completion. Returns whether it changed the state.
    pub fn finish(&mut self, completion: Completion) -> bool {
        let Completion { guard, outcome } = completion;
        let ticket = guard.ticket;
        drop(guard);

        if self.policy == OverlapPolicy::LatestRequestWins {
            if let Some(newer) = self.newest_outstanding().filter(|&newer| newer > ticket) {
                info!(
                    "Discarding response for superseded analysis #{} (#{} is outstanding)",
                    ticket, newer
                );
                return false;
            }
            if ticket < self.last_applied {
                info!(
                    "Discarding response for superseded analysis #{} (#{} already applied)",
                    ticket, self.last_applied
                );
                return false;
            }
        }
        self.last_applied = self.last_applied.max(ticket);

        self.state = match outcome {
            Ok(result) => {
                info!(
                    "Analysis #{} succeeded ({} field samples)",
                    ticket,
                    result.magnetic_field_time_series.len()
                );
                RequestState::Succeeded(result)
            }
            Err(error) => {
                warn!("Analysis #{} failed: {}", ticket, error);
                RequestState::Failed {
                    error,
                    retained: None,
                }
            }
        };
        true
    }

    /// Validate, send once through `transport`, and apply the outcome.
    pub async fn submit<T: AnalysisTransport>(&mut self, transport: &T) -> &RequestState {
        match self.begin_submit() {
            Ok(submission) => {
                let completion = submission.send(transport).await;
                self.finish(completion);
            }
            Err(e) => debug!("Submission not sent: {}", e),
        }
        &self.state
    }

    /// Borrowed view for rendering.
    pub fn view(&self) -> WorkflowView<'_> {
        WorkflowView {
            parameters: &self.parameters,
            signal: self
                .files
                .get(FileRole::Signal)
                .map(|f| FileView::new(FileRole::Signal, f)),
            noise: self
                .files
                .get(FileRole::Noise)
                .map(|f| FileView::new(FileRole::Noise, f)),
            submitting: self.state.is_submitting() && self.in_flight() > 0,
            error: self.state.error().map(|e| e.to_string()),
            result: self.state.result().map(ResultView::new),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !self.files.is_complete() {
            return Err(ValidationError::MissingArchives);
        }
        if let Some(name) = self.parameters.first_invalid() {
            return Err(ValidationError::InvalidParameter { name });
        }
        Ok(())
    }

    fn newest_outstanding(&self) -> Option<u64> {
        lock(&self.outstanding).last().copied()
    }
}
