//! Mapping raw service responses into results or errors.

use serde_json::Value;
use tracing::debug;

use super::RawResponse;
use crate::models::AnalysisResult;
use crate::workflow::AnalysisError;

/// Classify a completed HTTP exchange.
///
/// - non-2xx: the body's `error` string if there is one, else the status code
/// - 2xx with an `error` string: the service reported a data problem
/// - 2xx otherwise: must parse as [`AnalysisResult`]
pub fn classify(response: RawResponse) -> Result<AnalysisResult, AnalysisError> {
    let status = response.status;
    let parsed = serde_json::from_slice::<Value>(&response.body);

    if !response.is_success() {
        return Err(match parsed.as_ref().ok().and_then(service_message) {
            Some(message) => AnalysisError::Service { status, message },
            None => {
                debug!("Status {} without a usable error body", status);
                AnalysisError::ServiceStatus { status }
            }
        });
    }

    let value = parsed.map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;

    if let Some(message) = service_message(&value) {
        return Err(AnalysisError::Service { status, message });
    }

    serde_json::from_value(value).map_err(|e| AnalysisError::MalformedResponse(e.to_string()))
}

fn service_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
