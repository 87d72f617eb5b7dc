//! Simulated progress feedback for in-flight generate calls.
//!
//! While the remote call runs, a ticker walks a fixed message sequence and
//! publishes each step for its configured duration. The ticker is a
//! cooperative task: it checks a cancellation flag between steps and inside
//! each timed wait, and it stops without fast-forwarding through the
//! remaining messages once the remote call settles.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::request::DetailLevel;

/// One step of the progress sequence: a message shown for a fixed duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStep {
    pub message: &'static str,
    pub duration: Duration,
}

impl ProgressStep {
    const fn new(message: &'static str, millis: u64) -> Self {
        Self {
            message,
            duration: Duration::from_millis(millis),
        }
    }
}

const DETAILED_STEPS: &[ProgressStep] = &[
    ProgressStep::new("Analysing installation details", 1200),
    ProgressStep::new("Checking BS 7671 inspection requirements", 1800),
    ProgressStep::new("Building maintenance intervals", 1600),
    ProgressStep::new("Estimating costs and parts", 1400),
    ProgressStep::new("Finalising your schedule", 2000),
];

const STANDARD_STEPS: &[ProgressStep] = &[
    ProgressStep::new("Analysing installation details", 1500),
    ProgressStep::new("Building maintenance intervals", 2000),
    ProgressStep::new("Finalising your schedule", 2500),
];

/// Fixed step sequence for a detail level.
pub fn sequence(detail: DetailLevel) -> &'static [ProgressStep] {
    match detail {
        DetailLevel::Standard => STANDARD_STEPS,
        DetailLevel::Detailed => DETAILED_STEPS,
    }
}

/// Publishes progress messages for one generate attempt.
///
/// Each attempt gets its own publisher stamped with the attempt's
/// generation; once the advisor moves on (reset or a newer attempt), sends
/// from the stale publisher become no-ops instead of overwriting newer
/// state.
#[derive(Clone)]
pub(crate) struct ProgressPublisher {
    sender: watch::Sender<Option<String>>,
    current: Arc<AtomicU64>,
    generation: u64,
}

impl ProgressPublisher {
    pub(crate) fn new(
        sender: watch::Sender<Option<String>>,
        current: Arc<AtomicU64>,
        generation: u64,
    ) -> Self {
        Self {
            sender,
            current,
            generation,
        }
    }

    fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    /// Publish a message. Returns false once the attempt is stale, which
    /// tells the ticker to stop.
    pub(crate) fn publish(&self, message: &str) -> bool {
        if !self.is_current() {
            return false;
        }
        self.sender.send_replace(Some(message.to_string()));
        true
    }

    /// Clear the progress message, unless a newer attempt owns it.
    pub(crate) fn clear(&self) {
        if self.is_current() {
            self.sender.send_replace(None);
        }
    }
}

/// Walk `steps` in order, publishing each message for its duration.
pub(crate) async fn run_ticker(
    steps: &'static [ProgressStep],
    publisher: ProgressPublisher,
    mut cancel: watch::Receiver<bool>,
) {
    for step in steps {
        if *cancel.borrow() {
            break;
        }
        if !publisher.publish(step.message) {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(step.duration) => {}
            _ = cancel.changed() => {
                if *cancel.borrow() {
                    break;
                }
            }
        }
    }
}
