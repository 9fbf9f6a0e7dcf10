pub mod answers;
pub mod confirm;
pub mod countdown;
mod coordinator;
pub mod navigation;
pub mod scoring;


use std::sync::{Arc, Mutex, MutexGuard};

use time::PrimitiveDateTime;
use tokio::sync::watch;

use crate::backend::AssessmentBackend;
use crate::core::config::SubmitSettings;
use crate::core::time::primitive_now_utc;
use crate::domain::models::{AssessmentDefinition, ExecutionResult, Question};
use crate::domain::types::{FinalizeMode, SessionPhase};
use crate::session::answers::{AnswerSheet, SelectionError};
use crate::session::confirm::SubmitCheck;
use crate::session::countdown::Countdown;
use crate::session::coordinator::PhaseGate;
use crate::session::navigation::QuestionCursor;

pub use crate::session::coordinator::{FinalizeError, FinalizeOutcome};

/// One student's attempt at one timed practice. Owns the answer sheet, the
/// countdown, the navigation cursor and the finalize gate; everything the
/// host does to a running session goes through this object.
pub struct Session {
    id: String,
    definition: Arc<AssessmentDefinition>,
    answers: Mutex<AnswerSheet>,
    cursor: Mutex<QuestionCursor>,
    clock: Countdown,
    gate: PhaseGate,
    result: Mutex<Option<ExecutionResult>>,
    rejection: Mutex<Option<String>>,
    backend: Arc<dyn AssessmentBackend>,
    submit: SubmitSettings,
    done_tx: watch::Sender<bool>,
    started_at: PrimitiveDateTime,
}

impl Session {
    pub(crate) fn open(
        id: &str,
        definition: Arc<AssessmentDefinition>,
        backend: Arc<dyn AssessmentBackend>,
        submit: SubmitSettings,
    ) -> Arc<Self> {
        let (done_tx, done_rx) = watch::channel(false);
        let session = Arc::new(Self {
            id: id.to_string(),
            answers: Mutex::new(AnswerSheet::seeded(definition.clone())),
            cursor: Mutex::new(QuestionCursor::new(definition.question_count())),
            clock: Countdown::started(definition.duration_seconds),
            gate: PhaseGate::new(),
            result: Mutex::new(None),
            rejection: Mutex::new(None),
            definition,
            backend,
            submit,
            done_tx,
            started_at: primitive_now_utc(),
        });

        tokio::spawn(countdown::run_clock(session.clone(), done_rx));
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn definition(&self) -> &AssessmentDefinition {
        &self.definition
    }

    pub fn phase(&self) -> SessionPhase {
        self.gate.phase()
    }

    pub fn clock(&self) -> &Countdown {
        &self.clock
    }

    pub fn started_at(&self) -> PrimitiveDateTime {
        self.started_at
    }

    pub fn question_count(&self) -> usize {
        self.definition.question_count()
    }

    pub fn select(&self, question_id: &str, option_id: &str) -> Result<(), SelectionError> {
        self.answers_mut().select(question_id, option_id)
    }

    pub fn selected(&self, question_id: &str) -> Option<String> {
        self.answers_mut().selected(question_id).map(ToOwned::to_owned)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.lock().expect("answers lock").answered_count()
    }

    /// Advisory check for the manual submit path; the deadline path never
    /// asks.
    pub fn submit_check(&self) -> SubmitCheck {
        confirm::check(self.answered_count(), self.question_count())
    }

    pub fn current_index(&self) -> usize {
        self.cursor.lock().expect("cursor lock").current()
    }

    pub fn current_question(&self) -> &Question {
        &self.definition.questions[self.current_index()]
    }

    pub fn next_question(&self) -> usize {
        self.cursor.lock().expect("cursor lock").next()
    }

    pub fn previous_question(&self) -> usize {
        self.cursor.lock().expect("cursor lock").previous()
    }

    pub fn go_to_question(&self, index: usize) -> usize {
        self.cursor.lock().expect("cursor lock").go_to(index)
    }

    /// Close the session from either trigger. Safe to call from the
    /// deadline task and a student action at the same time; exactly one
    /// caller proceeds past the gate.
    pub async fn finalize(&self, mode: FinalizeMode) -> Result<FinalizeOutcome, FinalizeError> {
        coordinator::finalize_session(self, mode).await
    }

    pub fn result(&self) -> Option<ExecutionResult> {
        self.result.lock().expect("result lock").clone()
    }

    /// Resolves once the session reaches a terminal phase or is released.
    pub async fn finished(&self) {
        let mut done = self.done_tx.subscribe();
        while !*done.borrow_and_update() {
            if done.changed().await.is_err() {
                return;
            }
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        matches!(self.phase(), SessionPhase::Active | SessionPhase::Finalizing)
    }

    pub(crate) fn gate(&self) -> &PhaseGate {
        &self.gate
    }

    pub(crate) fn answers_mut(&self) -> MutexGuard<'_, AnswerSheet> {
        self.answers.lock().expect("answers lock")
    }

    pub(crate) fn backend(&self) -> &dyn AssessmentBackend {
        self.backend.as_ref()
    }

    pub(crate) fn submit_settings(&self) -> &SubmitSettings {
        &self.submit
    }

    pub(crate) fn store_result(&self, result: ExecutionResult) {
        *self.result.lock().expect("result lock") = Some(result);
    }

    pub(crate) fn set_rejection(&self, message: &str) {
        *self.rejection.lock().expect("rejection lock") = Some(message.to_string());
    }

    pub(crate) fn rejection_message(&self) -> String {
        self.rejection
            .lock()
            .expect("rejection lock")
            .clone()
            .unwrap_or_else(|| "execution rejected".to_string())
    }

    /// Stops the tick task and wakes anyone waiting in `finished`.
    pub(crate) fn signal_done(&self) {
        self.done_tx.send_replace(true);
    }

    pub(crate) fn done_watch(&self) -> watch::Receiver<bool> {
        self.done_tx.subscribe()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .field("remaining_seconds", &self.clock.remaining_seconds())
            .finish()
    }
}
