use std::sync::{Arc, OnceLock};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::backend::MemoryBackend;
use crate::core::config::Settings;
use crate::domain::models::{AnswerOption, AssessmentDefinition, Question};
use crate::domain::types::ContentBlock;
use crate::engine::Engine;

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("PRAXIO_ENV", "test");
    std::env::set_var("PRAXIO_STRICT_CONFIG", "0");
    std::env::set_var("MAX_ACTIVE_SESSIONS", "150");
    std::env::set_var("MAX_SUBMIT_RETRIES", "3");
    std::env::set_var("SUBMIT_RETRY_BACKOFF_SECONDS", "1");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    std::env::remove_var("PRAXIO_BACKEND_API_KEY");
}

pub(crate) async fn test_settings() -> Settings {
    test_settings_with(&[]).await
}

pub(crate) async fn test_settings_with(overrides: &[(&str, &str)]) -> Settings {
    let _guard = env_lock().await;
    set_test_env();
    for (key, value) in overrides {
        std::env::set_var(key, value);
    }
    Settings::load().expect("settings")
}

pub(crate) fn answer_option(id: &str, text: &str, correct: bool) -> AnswerOption {
    AnswerOption { id: id.to_string(), text: text.to_string(), correct }
}

pub(crate) fn question(id: &str, options: Vec<AnswerOption>) -> Question {
    Question {
        id: id.to_string(),
        blocks: vec![ContentBlock::Text { position: 1, body: format!("Prompt for {id}") }],
        options,
    }
}

/// Ten-second practice with two questions; options `o-1a` and `o-2a` are
/// the correct ones.
pub(crate) fn two_question_definition() -> AssessmentDefinition {
    AssessmentDefinition {
        id: "def-1".to_string(),
        title: "Kinematics warm-up".to_string(),
        duration_seconds: 10,
        questions: vec![
            question(
                "q-1",
                vec![answer_option("o-1a", "4.9 m", true), answer_option("o-1b", "9.8 m", false)],
            ),
            question(
                "q-2",
                vec![answer_option("o-2a", "2.0 s", true), answer_option("o-2b", "4.0 s", false)],
            ),
        ],
    }
}

pub(crate) fn seeded_backend(session_id: &str) -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new());
    backend.seed_definition(session_id, two_question_definition());
    backend
}

pub(crate) async fn engine_with(backend: Arc<MemoryBackend>) -> Engine {
    Engine::new(test_settings().await, backend)
}
