//! Shared test infrastructure for advisor integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use voltplan::backend::{ScheduleBackend, TransportError};
use voltplan::request::RequestPatch;

/// What the mock backend does after its configured delay.
pub enum MockOutcome {
    Respond(Value),
    TransportFail,
}

/// In-process backend with a controllable settle time and canned outcome.
pub struct MockBackend {
    outcome: MockOutcome,
    delay: Duration,
    calls: AtomicUsize,
    last_body: Mutex<Option<Value>>,
}

impl MockBackend {
    pub fn new(outcome: MockOutcome, delay: Duration) -> Self {
        Self {
            outcome,
            delay,
            calls: AtomicUsize::new(0),
            last_body: Mutex::new(None),
        }
    }

    pub fn respond(response: Value) -> Self {
        Self::new(MockOutcome::Respond(response), Duration::ZERO)
    }

    pub fn transport_fail() -> Self {
        Self::new(MockOutcome::TransportFail, Duration::ZERO)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.last_body.lock().expect("mock lock").clone()
    }
}

#[async_trait]
impl ScheduleBackend for MockBackend {
    async fn call(&self, _function: &str, body: Value) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_body.lock().expect("mock lock") = Some(body);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.outcome {
            MockOutcome::Respond(value) => Ok(value.clone()),
            MockOutcome::TransportFail => Err(TransportError::Command(
                "connection refused".to_string(),
            )),
        }
    }
}

/// A patch that satisfies all three required fields.
pub fn valid_input() -> RequestPatch {
    RequestPatch {
        property_type: Some("domestic".to_string()),
        installation_description: Some("1970s consumer unit, partial rewire 2015".to_string()),
        postcode: Some("SW1A 1AA".to_string()),
        ..RequestPatch::default()
    }
}

/// A well-formed success response carrying `tasks` schedule entries.
pub fn success_response(tasks: usize) -> Value {
    let items: Vec<Value> = (0..tasks)
        .map(|index| json!({"task": format!("Task {index}")}))
        .collect();
    json!({"success": true, "schedule": {"schedule": items, "partial": false}})
}
