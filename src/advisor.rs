//! The maintenance advisor: owns one request/response lifecycle against the
//! remote schedule service.
//!
//! The advisor is an explicit service object; nothing here is process-global,
//! so multiple advisors (several open forms, several CLI invocations in one
//! process) never interfere. Each generate attempt runs the remote call and
//! the progress ticker concurrently, awaits the remote call first, stops the
//! ticker, classifies the response, and commits the outcome.
//!
//! `generate` never returns an error: every failure becomes a state
//! transition back to input plus a single user-visible notice. Attempts
//! superseded by `reset` or a newer `generate` commit nothing and return no
//! notice; a generation counter guards against a stale response overwriting
//! newer state. The remote call itself is never aborted once issued.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::{ScheduleBackend, GENERATE_FUNCTION};
use crate::error::GenerateError;
use crate::notice::Notice;
use crate::plan::MaintenancePlan;
use crate::progress::{self, ProgressPublisher, ProgressStep};
use crate::request::{DetailLevel, RequestPatch, ScheduleRequest};
use crate::response::classify_response;

/// Lifecycle phase of the advisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Input,
    Processing,
    Results,
}

#[derive(Default)]
struct AdvisorState {
    phase: Phase,
    request: ScheduleRequest,
    plan: Option<MaintenancePlan>,
}

/// Orchestrates schedule generation against a pluggable backend.
pub struct MaintenanceAdvisor {
    backend: Arc<dyn ScheduleBackend>,
    steps: &'static [ProgressStep],
    state: Mutex<AdvisorState>,
    generation: Arc<AtomicU64>,
    progress: watch::Sender<Option<String>>,
}

impl MaintenanceAdvisor {
    /// Create an advisor using the detailed progress sequence.
    pub fn new(backend: Arc<dyn ScheduleBackend>) -> Self {
        Self::with_steps(backend, progress::sequence(DetailLevel::Detailed))
    }

    /// Create an advisor with an explicit progress sequence.
    pub fn with_steps(
        backend: Arc<dyn ScheduleBackend>,
        steps: &'static [ProgressStep],
    ) -> Self {
        let (progress, _) = watch::channel(None);
        Self {
            backend,
            steps,
            state: Mutex::new(AdvisorState::default()),
            generation: Arc::new(AtomicU64::new(0)),
            progress,
        }
    }

    fn lock(&self) -> MutexGuard<'_, AdvisorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn is_processing(&self) -> bool {
        self.lock().phase == Phase::Processing
    }

    pub fn request(&self) -> ScheduleRequest {
        self.lock().request.clone()
    }

    /// The last committed plan, if the advisor is in the results phase.
    pub fn plan(&self) -> Option<MaintenancePlan> {
        self.lock().plan.clone()
    }

    /// Current progress message, if a generate attempt is publishing one.
    pub fn progress_message(&self) -> Option<String> {
        self.progress.borrow().clone()
    }

    /// Subscribe to progress messages. `None` means no message is showing.
    pub fn subscribe_progress(&self) -> watch::Receiver<Option<String>> {
        self.progress.subscribe()
    }

    /// Merge a partial update into the request. No validation happens here.
    pub fn update_request(&self, patch: RequestPatch) {
        self.lock().request.merge(patch);
    }

    /// Return to the input phase with empty input and no plan.
    ///
    /// Idempotent. An in-flight remote call is not aborted, but the
    /// generation bump guarantees its eventual response commits nothing.
    pub fn reset(&self) {
        {
            let mut state = self.lock();
            state.phase = Phase::Input;
            state.request = ScheduleRequest::default();
            state.plan = None;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.progress.send_replace(None);
    }

    /// Run one generate attempt.
    ///
    /// Returns the user-visible notice for the attempt, or `None` when the
    /// attempt was superseded before its response settled. The processing
    /// phase and the progress message are cleared on every exit path,
    /// including unwinding.
    pub async fn generate(&self) -> Option<Notice> {
        let (body, generation) = {
            let mut state = self.lock();
            let validated = match state.request.validated() {
                Ok(validated) => validated,
                Err(err) => {
                    warn!(%err, "generate rejected before remote call");
                    return Some(Notice::from_error(&err));
                }
            };
            state.phase = Phase::Processing;
            state.plan = None;
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (validated.into_body(), generation)
        };
        let started = Instant::now();

        let publisher =
            ProgressPublisher::new(self.progress.clone(), self.generation.clone(), generation);
        let _cleanup = ProcessingGuard {
            advisor: self,
            generation,
            publisher: publisher.clone(),
        };

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let ticker = tokio::spawn(progress::run_ticker(self.steps, publisher, cancel_rx));

        let settled = self.backend.call(GENERATE_FUNCTION, body).await;

        // The remote call has settled: cancel the ticker and wait until it
        // has observed the flag before committing any outcome.
        let _ = cancel_tx.send(true);
        let _ = ticker.await;

        let outcome = settled
            .map_err(GenerateError::from)
            .and_then(classify_response);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let mut state = self.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "attempt superseded; discarding settled response");
            return None;
        }
        let notice = match outcome {
            Ok(plan) => {
                let notice = if plan.partial {
                    Notice::PartialSchedule {
                        missing_sections: plan.missing_sections.clone(),
                    }
                } else {
                    Notice::ScheduleReady {
                        task_count: plan.schedule.len(),
                    }
                };
                info!(
                    elapsed_ms,
                    tasks = plan.schedule.len(),
                    partial = plan.partial,
                    "schedule generated"
                );
                state.phase = Phase::Results;
                state.plan = Some(plan);
                notice
            }
            Err(err) => {
                warn!(%err, elapsed_ms, "generate failed");
                state.phase = Phase::Input;
                Notice::from_error(&err)
            }
        };
        Some(notice)
    }
}

/// Clears the processing phase and progress message when a generate attempt
/// leaves scope, however it leaves.
struct ProcessingGuard<'a> {
    advisor: &'a MaintenanceAdvisor,
    generation: u64,
    publisher: ProgressPublisher,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        // A newer attempt or a reset owns the advisor now; touch nothing.
        if self.advisor.generation.load(Ordering::SeqCst) != self.generation {
            return;
        }
        {
            let mut state = self.advisor.lock();
            if state.phase == Phase::Processing {
                state.phase = Phase::Input;
            }
        }
        self.publisher.clear();
    }
}
