use std::sync::atomic::{AtomicU8, Ordering};

use anyhow::anyhow;
use thiserror::Error;
use tokio::time::{sleep, Duration};

use crate::backend::{SubmitExecutionError, SubmitExecutionRequest};
use crate::domain::models::ExecutionResult;
use crate::domain::types::{FinalizeMode, SessionPhase};
use crate::session::{scoring, Session};

const ACTIVE: u8 = 0;
const FINALIZING: u8 = 1;
const FINALIZED: u8 = 2;
const REJECTED: u8 = 3;

/// The serialization point between the deadline task and the student's
/// submit action. Whichever caller wins the compare-and-set owns the whole
/// finalization; everyone else observes `Superseded`.
#[derive(Debug)]
pub(crate) struct PhaseGate(AtomicU8);

impl PhaseGate {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(ACTIVE))
    }

    fn begin(&self) -> bool {
        self.0.compare_exchange(ACTIVE, FINALIZING, Ordering::AcqRel, Ordering::Acquire).is_ok()
    }

    fn complete(&self) {
        self.0.store(FINALIZED, Ordering::Release);
    }

    fn revert(&self) {
        self.0.store(ACTIVE, Ordering::Release);
    }

    fn reject(&self) {
        self.0.store(REJECTED, Ordering::Release);
    }

    pub(crate) fn phase(&self) -> SessionPhase {
        match self.0.load(Ordering::Acquire) {
            ACTIVE => SessionPhase::Active,
            FINALIZING => SessionPhase::Finalizing,
            FINALIZED => SessionPhase::Finalized,
            _ => SessionPhase::Rejected,
        }
    }
}

#[derive(Debug)]
pub enum FinalizeOutcome {
    /// This caller won the gate and the execution is recorded.
    Completed(ExecutionResult),
    /// The other trigger is (or was) handling finalization; nothing to do.
    Superseded,
}

#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("execution rejected by the platform: {0}")]
    Rejected(String),
    #[error("execution submit kept failing: {0}")]
    Transient(#[source] anyhow::Error),
    #[error("finalization cancelled before the execution was recorded")]
    Cancelled,
}

pub(crate) async fn finalize_session(
    session: &Session,
    mode: FinalizeMode,
) -> Result<FinalizeOutcome, FinalizeError> {
    if !session.gate().begin() {
        return match session.gate().phase() {
            SessionPhase::Rejected => Err(FinalizeError::Rejected(session.rejection_message())),
            _ => Ok(FinalizeOutcome::Superseded),
        };
    }

    session.clock().freeze();
    let snapshot = {
        let mut sheet = session.answers_mut();
        sheet.seal();
        sheet.snapshot()
    };

    let scorecard = scoring::score(session.definition(), &snapshot);
    let request = SubmitExecutionRequest {
        selected_option_ids: scorecard.selected_option_ids,
        correct_answers: scorecard.correct_answers,
        elapsed_seconds: session.clock().elapsed_seconds(),
        mode,
    };

    let submit = session.submit_settings();
    let mut cancel = session.done_watch();
    let mut last_error: Option<anyhow::Error> = None;

    for attempt in 0..=submit.max_submit_retries {
        match session.backend().submit_execution(session.id(), request.clone()).await {
            Ok(result) => {
                session.store_result(result.clone());
                session.gate().complete();
                session.signal_done();
                metrics::counter!(
                    "practice_sessions_finalized_total",
                    "mode" => mode.as_str().to_string()
                )
                .increment(1);
                tracing::info!(
                    session_id = %session.id(),
                    mode = mode.as_str(),
                    correct_answers = result.correct_answers,
                    answered = request.selected_option_ids.len(),
                    "Execution recorded"
                );
                return Ok(FinalizeOutcome::Completed(result));
            }
            Err(SubmitExecutionError::Validation(message)) => {
                session.set_rejection(&message);
                session.gate().reject();
                session.signal_done();
                metrics::counter!("practice_submissions_rejected_total").increment(1);
                tracing::error!(
                    session_id = %session.id(),
                    mode = mode.as_str(),
                    error = %message,
                    "Execution rejected, session closed without a result"
                );
                return Err(FinalizeError::Rejected(message));
            }
            Err(SubmitExecutionError::Transient(err)) => {
                metrics::counter!("practice_submit_retries_total").increment(1);
                tracing::warn!(
                    session_id = %session.id(),
                    mode = mode.as_str(),
                    attempt,
                    error = %err,
                    "Execution submit failed, will retry"
                );
                last_error = Some(err);
            }
        }

        if attempt < submit.max_submit_retries {
            if *cancel.borrow_and_update() {
                rollback(session);
                return Err(FinalizeError::Cancelled);
            }
            let backoff = Duration::from_secs(submit.retry_backoff_seconds << attempt);
            tokio::select! {
                _ = cancel.changed() => {
                    rollback(session);
                    return Err(FinalizeError::Cancelled);
                }
                _ = sleep(backoff) => {}
            }
        }
    }

    rollback(session);
    Err(FinalizeError::Transient(
        last_error.unwrap_or_else(|| anyhow!("execution submit failed with no recorded cause")),
    ))
}

/// Transient exhaustion or cancellation: hand the session back in the exact
/// shape it had before the attempt, so either trigger can try again.
fn rollback(session: &Session) {
    session.answers_mut().unseal();
    session.clock().resume();
    session.gate().revert();
}
