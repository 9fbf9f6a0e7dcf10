use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use validator::Validate;

use crate::backend::{AssessmentBackend, LoadDefinitionError};
use crate::core::config::Settings;
use crate::domain::models::AssessmentDefinition;
use crate::session::Session;

#[derive(Debug, Error)]
pub enum OpenSessionError {
    #[error("no assessment definition for session {0}")]
    NotFound(String),
    #[error("too many practice sessions are already running")]
    AtCapacity,
    #[error("assessment definition failed validation: {0}")]
    InvalidDefinition(String),
    #[error("transient definition fetch failure: {0}")]
    Transient(#[source] anyhow::Error),
}

/// Shared engine state: settings, the platform backend, and the registry of
/// live sessions. Cheap to clone; one instance per embedding host.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<InnerEngine>,
}

struct InnerEngine {
    settings: Settings,
    backend: Arc<dyn AssessmentBackend>,
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl Engine {
    pub fn new(settings: Settings, backend: Arc<dyn AssessmentBackend>) -> Self {
        Self { inner: Arc::new(InnerEngine { settings, backend, sessions: Mutex::new(HashMap::new()) }) }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    /// Open the session for `session_id`, loading and seeding on first call.
    /// A repeated call (a remount, a page refresh) re-attaches to the live
    /// session instead of re-seeding answers or starting a second clock.
    pub async fn open_session(&self, session_id: &str) -> Result<Arc<Session>, OpenSessionError> {
        let mut sessions = self.inner.sessions.lock().await;

        if let Some(existing) = sessions.get(session_id) {
            tracing::debug!(session_id, "Re-attached to running session");
            return Ok(existing.clone());
        }

        let active = sessions.values().filter(|session| session.is_active()).count();
        if active >= self.inner.settings.session().max_active_sessions as usize {
            return Err(OpenSessionError::AtCapacity);
        }

        let definition =
            self.inner.backend.load_definition(session_id).await.map_err(|err| match err {
                LoadDefinitionError::NotFound(id) => OpenSessionError::NotFound(id),
                LoadDefinitionError::Transient(source) => OpenSessionError::Transient(source),
            })?;
        let definition = prepare_definition(definition)?;

        let session = Session::open(
            session_id,
            Arc::new(definition),
            self.inner.backend.clone(),
            self.inner.settings.submit().clone(),
        );
        sessions.insert(session_id.to_string(), session.clone());

        metrics::counter!("practice_sessions_opened_total").increment(1);
        tracing::info!(
            session_id,
            questions = session.question_count(),
            duration_seconds = session.definition().duration_seconds,
            "Practice session opened"
        );

        Ok(session)
    }

    pub async fn session(&self, session_id: &str) -> Option<Arc<Session>> {
        self.inner.sessions.lock().await.get(session_id).cloned()
    }

    /// Drop a session the student walked away from. Stops its clock and
    /// cancels any in-flight submit retry; the session itself stays usable
    /// for whoever still holds a handle, but the engine forgets it.
    pub async fn release_session(&self, session_id: &str) -> bool {
        let removed = self.inner.sessions.lock().await.remove(session_id);
        match removed {
            Some(session) => {
                session.signal_done();
                tracing::info!(session_id, "Practice session released");
                true
            }
            None => false,
        }
    }

    pub async fn active_sessions(&self) -> usize {
        self.inner.sessions.lock().await.values().filter(|session| session.is_active()).count()
    }
}

impl Drop for InnerEngine {
    fn drop(&mut self) {
        for session in self.sessions.get_mut().values() {
            session.signal_done();
        }
    }
}

/// Definitions arrive from the wire unchecked: enforce shape invariants and
/// put content blocks into their authoritative order before the session
/// ever sees them.
fn prepare_definition(
    mut definition: AssessmentDefinition,
) -> Result<AssessmentDefinition, OpenSessionError> {
    definition
        .validate()
        .map_err(|err| OpenSessionError::InvalidDefinition(err.to_string()))?;
    for question in &mut definition.questions {
        question.sort_blocks();
    }
    Ok(definition)
}
