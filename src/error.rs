//! Failure taxonomy for one generate attempt.
//!
//! Every variant maps to exactly one user-visible notice category; the
//! advisor converts errors into notices at its boundary and never lets them
//! propagate to callers.

use thiserror::Error;

use crate::backend::TransportError;

/// Classified failure of a single schedule-generation attempt.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A required input field was empty after trimming. Detected locally,
    /// before any remote interaction.
    #[error("required fields missing: {}", missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    /// The remote call itself could not complete.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The remote side explicitly reported failure.
    #[error("remote failure: {message}")]
    Remote {
        message: String,
        code: Option<String>,
    },

    /// The response did not match the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The response was well-formed but carried zero schedule entries.
    #[error("empty schedule in response")]
    EmptyResult,
}

impl GenerateError {
    /// Short human-readable description suitable for a failure notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { missing } => {
                format!("please fill in: {}", missing.join(", "))
            }
            Self::Transport(_) => {
                "could not reach the schedule service; check your connection and try again"
                    .to_string()
            }
            Self::Remote { message, .. } => message.clone(),
            Self::MalformedResponse(_) => {
                "the schedule service returned an unexpected response".to_string()
            }
            Self::EmptyResult => {
                "no schedule entries were produced; try adding more detail about the installation"
                    .to_string()
            }
        }
    }

    /// Machine code supplied by the remote side, when present.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Remote { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
