use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use uuid::Uuid;

use crate::backend::{
    AssessmentBackend, LoadDefinitionError, SubmitExecutionError, SubmitExecutionRequest,
};
use crate::core::time::{format_primitive, primitive_now_utc};
use crate::domain::models::{AssessmentDefinition, ExecutionResult};

/// In-process backend for tests and demo hosts. Holds definitions keyed by
/// session id and stores at most one execution per session, mirroring the
/// idempotency the real platform promises.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    definitions: Mutex<HashMap<String, AssessmentDefinition>>,
    executions: Mutex<HashMap<String, ExecutionResult>>,
    transient_load_failures: AtomicU32,
    transient_submit_failures: AtomicU32,
    reject_submissions: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_definition(&self, session_id: &str, definition: AssessmentDefinition) {
        self.definitions
            .lock()
            .expect("definitions lock")
            .insert(session_id.to_string(), definition);
    }

    /// Make the next `count` load calls fail as network-class errors.
    pub fn fail_next_loads(&self, count: u32) {
        self.transient_load_failures.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` submit calls fail as network-class errors.
    pub fn fail_next_submissions(&self, count: u32) {
        self.transient_submit_failures.store(count, Ordering::SeqCst);
    }

    /// Make every submit call fail as a validation rejection.
    pub fn reject_submissions(&self, reject: bool) {
        self.reject_submissions.store(reject, Ordering::SeqCst);
    }

    pub fn execution_for(&self, session_id: &str) -> Option<ExecutionResult> {
        self.executions.lock().expect("executions lock").get(session_id).cloned()
    }

    pub fn execution_count(&self) -> usize {
        self.executions.lock().expect("executions lock").len()
    }

    fn consume_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |value| value.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl AssessmentBackend for MemoryBackend {
    async fn load_definition(
        &self,
        session_id: &str,
    ) -> Result<AssessmentDefinition, LoadDefinitionError> {
        if Self::consume_failure(&self.transient_load_failures) {
            return Err(LoadDefinitionError::Transient(anyhow!("injected definition fetch failure")));
        }

        self.definitions
            .lock()
            .expect("definitions lock")
            .get(session_id)
            .cloned()
            .ok_or_else(|| LoadDefinitionError::NotFound(session_id.to_string()))
    }

    async fn submit_execution(
        &self,
        session_id: &str,
        request: SubmitExecutionRequest,
    ) -> Result<ExecutionResult, SubmitExecutionError> {
        if self.reject_submissions.load(Ordering::SeqCst) {
            return Err(SubmitExecutionError::Validation(
                "execution payload rejected".to_string(),
            ));
        }

        if Self::consume_failure(&self.transient_submit_failures) {
            return Err(SubmitExecutionError::Transient(anyhow!("injected submit failure")));
        }

        let mut executions = self.executions.lock().expect("executions lock");
        let result = executions.entry(session_id.to_string()).or_insert_with(|| ExecutionResult {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            selected_option_ids: request.selected_option_ids.clone(),
            correct_answers: request.correct_answers,
            elapsed_seconds: request.elapsed_seconds,
            submitted_at: format_primitive(primitive_now_utc()),
            mode: request.mode,
        });
        Ok(result.clone())
    }
}
