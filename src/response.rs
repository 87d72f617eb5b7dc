//! Defensive classification of remote responses.
//!
//! The service's response shape is loose; rather than probing optional
//! fields at the call site, the whole envelope is classified here in one
//! pass. Check order is significant: the first failing check decides the
//! outcome and later checks are skipped, so a response that is both
//! remote-flagged and malformed classifies as a remote failure.

use serde_json::Value;

use crate::error::GenerateError;
use crate::plan::MaintenancePlan;

/// Classify a settled response into a plan or a failure.
///
/// Applied checks, in order:
/// 1. explicit `success: false` envelope,
/// 2. response is a JSON object at all,
/// 3. the `schedule` container exists and is an object,
/// 4. the container's `schedule` entry list exists and is non-empty,
/// 5. the container deserializes into [`MaintenancePlan`].
pub fn classify_response(value: Value) -> Result<MaintenancePlan, GenerateError> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("the schedule service reported a failure")
            .to_string();
        let code = value
            .get("code")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Err(GenerateError::Remote { message, code });
    }

    if !value.is_object() {
        return Err(GenerateError::MalformedResponse(
            "response is not a JSON object".to_string(),
        ));
    }

    let container = match value.get("schedule") {
        Some(container) if container.is_object() => container,
        _ => {
            return Err(GenerateError::MalformedResponse(
                "schedule container missing or not an object".to_string(),
            ))
        }
    };

    let has_entries = container
        .get("schedule")
        .and_then(Value::as_array)
        .is_some_and(|entries| !entries.is_empty());
    if !has_entries {
        return Err(GenerateError::EmptyResult);
    }

    serde_json::from_value(container.clone())
        .map_err(|err| GenerateError::MalformedResponse(format!("parse schedule payload: {err}")))
}
