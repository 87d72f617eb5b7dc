//! Remote schedule backends.
//!
//! The advisor talks to one named remote function through the
//! [`ScheduleBackend`] seam. Two real backends exist: an HTTP one for the
//! hosted service and a local-command one that pipes the request JSON over
//! stdin (any tool that reads JSON and prints JSON works, which keeps
//! development and offline use provider-free).
//!
//! A backend's only error is transport-level: the call could not complete.
//! A completed call that returned an unparsable body yields `Value::Null`
//! so the response classifier owns every shape decision.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::transcript::TranscriptLog;

/// Fixed identifier of the remote generate function.
pub const GENERATE_FUNCTION: &str = "generateMaintenanceSchedule";

/// The remote call could not complete.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend command failed: {0}")]
    Command(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Invokes a named remote function with a JSON body.
#[async_trait]
pub trait ScheduleBackend: Send + Sync {
    async fn call(&self, function: &str, body: Value) -> Result<Value, TransportError>;
}

/// HTTP backend for the hosted schedule service.
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

pub(crate) fn function_url(endpoint: &str, function: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), function)
}

#[async_trait]
impl ScheduleBackend for HttpBackend {
    async fn call(&self, function: &str, body: Value) -> Result<Value, TransportError> {
        let url = function_url(&self.endpoint, function);
        let started = Instant::now();
        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();
        // The service reports its own failures in the body; a non-2xx status
        // still carries a JSON envelope, so it is not a transport failure.
        let text = response.text().await?;
        info!(
            function,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            response_bytes = text.len(),
            "backend call complete"
        );
        Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
    }
}

/// Local-command backend: request JSON on stdin, response JSON on stdout.
pub struct CommandBackend {
    argv: Vec<String>,
}

impl CommandBackend {
    /// Parse and resolve the configured command line.
    pub fn new(command: &str) -> Result<Self, TransportError> {
        let argv = shell_words::split(command)
            .map_err(|err| TransportError::Command(format!("parse backend command: {err}")))?;
        if argv.is_empty() {
            return Err(TransportError::Command("backend command is empty".to_string()));
        }
        which::which(&argv[0])
            .map_err(|err| TransportError::Command(format!("resolve {}: {err}", argv[0])))?;
        Ok(Self { argv })
    }
}

#[async_trait]
impl ScheduleBackend for CommandBackend {
    async fn call(&self, function: &str, body: Value) -> Result<Value, TransportError> {
        let started = Instant::now();
        let mut child = tokio::process::Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .env("VOLTPLAN_FUNCTION", function)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let request = serde_json::to_vec(&body)
            .map_err(|err| TransportError::Command(format!("serialize request body: {err}")))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&request).await?;
        }

        let output = child.wait_with_output().await?;
        info!(
            function,
            elapsed_ms = started.elapsed().as_millis() as u64,
            response_bytes = output.stdout.len(),
            "backend command complete"
        );
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransportError::Command(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(serde_json::from_slice(&output.stdout).unwrap_or(Value::Null))
    }
}

/// Decorator that records each exchange to a transcript log.
///
/// Recording is best-effort: a transcript write failure is logged and never
/// affects the call result.
pub struct RecordingBackend {
    inner: Arc<dyn ScheduleBackend>,
    log: TranscriptLog,
}

impl RecordingBackend {
    pub fn new(inner: Arc<dyn ScheduleBackend>, log: TranscriptLog) -> Self {
        Self { inner, log }
    }
}

#[async_trait]
impl ScheduleBackend for RecordingBackend {
    async fn call(&self, function: &str, body: Value) -> Result<Value, TransportError> {
        let started = Instant::now();
        let result = self.inner.call(function, body.clone()).await;
        if let Err(err) = self.log.record(function, &body, &result, started.elapsed()) {
            warn!(error = %err, "failed to record backend transcript");
        }
        result
    }
}
