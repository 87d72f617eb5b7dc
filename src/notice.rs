//! User-visible notices produced by a generate attempt.
//!
//! Exactly one notice comes out of each attempt that is not superseded:
//! a validation failure, a generation failure, a partial-schedule warning,
//! or a success confirmation.

use std::fmt;

use crate::error::GenerateError;

/// Outcome of one generate attempt, phrased for end users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Required input fields were empty; nothing was sent.
    ValidationFailed { missing: Vec<&'static str> },

    /// The attempt failed after the remote call was issued.
    GenerationFailed {
        reason: String,
        code: Option<String>,
    },

    /// A schedule was produced but some sections are missing.
    PartialSchedule { missing_sections: Vec<String> },

    /// A complete schedule was produced.
    ScheduleReady { task_count: usize },
}

impl Notice {
    pub fn from_error(err: &GenerateError) -> Self {
        match err {
            GenerateError::Validation { missing } => Self::ValidationFailed {
                missing: missing.clone(),
            },
            other => Self::GenerationFailed {
                reason: other.user_message(),
                code: other.code().map(str::to_string),
            },
        }
    }

    /// True for the two failure categories; warnings and successes are not
    /// errors.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed { .. } | Self::GenerationFailed { .. }
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed { missing } => {
                write!(
                    f,
                    "Please fill in {} before generating a schedule.",
                    missing.join(", ")
                )
            }
            Self::GenerationFailed { reason, code } => {
                write!(f, "Could not generate a schedule: {reason}")?;
                if let Some(code) = code {
                    write!(f, " (code: {code})")?;
                }
                Ok(())
            }
            Self::PartialSchedule { missing_sections } => {
                if missing_sections.is_empty() {
                    write!(f, "Schedule generated, but some sections are missing.")
                } else {
                    write!(
                        f,
                        "Schedule generated, but these sections are missing: {}.",
                        missing_sections.join(", ")
                    )
                }
            }
            Self::ScheduleReady { task_count } => {
                let noun = if *task_count == 1 { "task" } else { "tasks" };
                write!(
                    f,
                    "Maintenance schedule ready with {task_count} {noun}."
                )
            }
        }
    }
}
