use serde::{Deserialize, Serialize};

/// Lifecycle of one practice session, as observed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Active,
    Finalizing,
    Finalized,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockPhase {
    Running,
    Expired,
}

/// Which trigger closed the session: the student pressing submit, or the
/// countdown reaching zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizeMode {
    ManualSubmit,
    AutoDeadline,
}

impl FinalizeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManualSubmit => "manual_submit",
            Self::AutoDeadline => "auto_deadline",
        }
    }
}

/// One renderable piece of question content. The `position` field is the
/// authoritative ordering; array order in transport payloads carries no
/// meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { position: i32, body: String },
    Image { position: i32, reference: String },
}

impl ContentBlock {
    pub fn position(&self) -> i32 {
        match self {
            Self::Text { position, .. } => *position,
            Self::Image { position, .. } => *position,
        }
    }
}
