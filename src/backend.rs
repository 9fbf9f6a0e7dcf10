mod http;
mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::models::{AssessmentDefinition, ExecutionResult};
use crate::domain::types::FinalizeMode;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

#[derive(Debug, Error)]
pub enum LoadDefinitionError {
    #[error("no assessment definition for session {0}")]
    NotFound(String),
    #[error("transient definition fetch failure: {0}")]
    Transient(#[source] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum SubmitExecutionError {
    #[error("execution rejected: {0}")]
    Validation(String),
    #[error("transient execution submit failure: {0}")]
    Transient(#[source] anyhow::Error),
}

/// Everything the coordinator sends when a session closes. The platform is
/// expected to treat submission as idempotent per session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitExecutionRequest {
    pub selected_option_ids: Vec<String>,
    pub correct_answers: u32,
    pub elapsed_seconds: u32,
    pub mode: FinalizeMode,
}

/// Boundary to the platform that stores definitions and graded executions.
/// The engine never touches storage directly; swapping this trait swaps the
/// whole persistence story.
#[async_trait]
pub trait AssessmentBackend: Send + Sync {
    async fn load_definition(
        &self,
        session_id: &str,
    ) -> Result<AssessmentDefinition, LoadDefinitionError>;

    async fn submit_execution(
        &self,
        session_id: &str,
        request: SubmitExecutionRequest,
    ) -> Result<ExecutionResult, SubmitExecutionError>;
}
