pub mod backend;
pub mod core;
pub mod domain;
pub mod engine;
pub mod session;

#[cfg(test)]
mod test_support;

pub use crate::backend::{
    AssessmentBackend, LoadDefinitionError, SubmitExecutionError, SubmitExecutionRequest,
};
pub use crate::core::config::Settings;
pub use crate::domain::models::{AssessmentDefinition, ExecutionResult};
pub use crate::engine::{Engine, OpenSessionError};
pub use crate::session::{FinalizeError, FinalizeOutcome, Session};

/// Process-wide telemetry setup for hosts embedding the engine. Call once,
/// before the first session is opened.
pub fn init_telemetry(settings: &Settings) -> anyhow::Result<()> {
    core::telemetry::init_tracing(settings)?;
    core::metrics::init(settings)?;

    tracing::info!(
        environment = settings.runtime().environment.as_str(),
        "Praxio practice engine telemetry initialized"
    );
    Ok(())
}
