use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::models::AssessmentDefinition;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("question {0} is not part of this assessment")]
    UnknownQuestion(String),
    #[error("option {option_id} does not belong to question {question_id}")]
    UnknownOption { question_id: String, option_id: String },
    #[error("session is closed for answer changes")]
    SessionClosed,
}

/// Per-session answer state: exactly one slot per question, seeded empty.
/// Re-selecting overwrites; nothing keeps history. Sealed while a
/// finalization attempt owns the sheet, so late selections fail instead of
/// leaking into the score.
#[derive(Debug)]
pub struct AnswerSheet {
    definition: Arc<AssessmentDefinition>,
    entries: HashMap<String, Option<String>>,
    sealed: bool,
}

/// Immutable copy of the answered entries, handed to scoring.
#[derive(Debug, Clone)]
pub struct AnswerSnapshot {
    entries: HashMap<String, String>,
}

impl AnswerSheet {
    pub(crate) fn seeded(definition: Arc<AssessmentDefinition>) -> Self {
        let entries =
            definition.questions.iter().map(|question| (question.id.clone(), None)).collect();
        Self { definition, entries, sealed: false }
    }

    pub fn select(&mut self, question_id: &str, option_id: &str) -> Result<(), SelectionError> {
        if self.sealed {
            return Err(SelectionError::SessionClosed);
        }

        let question = self
            .definition
            .question(question_id)
            .ok_or_else(|| SelectionError::UnknownQuestion(question_id.to_string()))?;
        if question.option(option_id).is_none() {
            return Err(SelectionError::UnknownOption {
                question_id: question_id.to_string(),
                option_id: option_id.to_string(),
            });
        }

        self.entries.insert(question_id.to_string(), Some(option_id.to_string()));
        Ok(())
    }

    pub fn selected(&self, question_id: &str) -> Option<&str> {
        self.entries.get(question_id).and_then(|entry| entry.as_deref())
    }

    pub fn answered_count(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_some()).count()
    }

    pub fn snapshot(&self) -> AnswerSnapshot {
        let entries = self
            .entries
            .iter()
            .filter_map(|(question_id, entry)| {
                entry.as_ref().map(|option_id| (question_id.clone(), option_id.clone()))
            })
            .collect();
        AnswerSnapshot { entries }
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    pub(crate) fn unseal(&mut self) {
        self.sealed = false;
    }
}

impl AnswerSnapshot {
    pub fn selected(&self, question_id: &str) -> Option<&str> {
        self.entries.get(question_id).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.entries.len()
    }
}
