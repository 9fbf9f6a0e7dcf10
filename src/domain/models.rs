use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::types::{ContentBlock, FinalizeMode};

/// Immutable description of one timed practice: what is asked, in which
/// order, and how long the student has. Loaded once per session and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssessmentDefinition {
    pub id: String,
    pub title: String,
    #[validate(range(min = 1, message = "duration_seconds must be positive"))]
    pub duration_seconds: u32,
    #[validate(length(min = 1, message = "definition must contain at least one question"), nested)]
    pub questions: Vec<Question>,
}

impl AssessmentDefinition {
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == question_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub blocks: Vec<ContentBlock>,
    #[validate(length(min = 1, message = "question must offer at least one option"))]
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn option(&self, option_id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|option| option.id == option_id)
    }

    /// Content blocks may arrive in any order; the explicit position field
    /// decides. Stable sort so equal positions keep their transport order.
    pub(crate) fn sort_blocks(&mut self) {
        self.blocks.sort_by_key(ContentBlock::position);
    }
}

/// One selectable answer. `correct` is grading ground truth and must never
/// influence how options are ordered or displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
    pub correct: bool,
}

/// The permanent record of one finished session. Created exactly once;
/// everything about the session is frozen the moment this exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub id: String,
    pub session_id: String,
    pub selected_option_ids: Vec<String>,
    pub correct_answers: u32,
    pub elapsed_seconds: u32,
    pub submitted_at: String,
    pub mode: FinalizeMode,
}
