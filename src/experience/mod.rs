//! Interaction experiences: chat messages, prompts, fallbacks and the
//! per-experience state machines.
//!
//! The state machines ([`GameState`], [`QuizState`], [`ExploreState`]) are
//! plain values updated through transition methods that either return the
//! next state or a [`TransitionError`], leaving the input untouched.

pub mod explore;
pub mod fallback;
pub mod game;
pub mod prompts;
pub mod quiz;
pub mod text;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use explore::{ExploreState, VisitedStop};
pub use game::{GameQuestion, GameState, ROUNDS};
pub use quiz::{QuestionProgress, QuizContext, QuizQuestion, QuizState};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One chat message. Only ever held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub streaming: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            streaming: false,
            audio_url: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            streaming: false,
            audio_url: None,
        }
    }
}

/// Content of the most recent user message, or an empty string.
pub fn last_user_message(messages: &[ChatMessage]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or_default()
}

/// A state transition that is not allowed from the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("game has not begun")]
    NotStarted,

    #[error("game already completed")]
    Completed,

    #[error("no option selected for round {0}")]
    NothingSelected(u32),

    #[error("option {option:?} is not offered in round {round}")]
    UnknownOption { round: u32, option: String },

    #[error("question is for round {got}, expected round {expected}")]
    WrongRound { expected: u32, got: u32 },

    #[error("question {0} already answered")]
    AlreadyAnswered(usize),

    #[error("no question at index {0}")]
    NoSuchQuestion(usize),

    #[error("answer index {answer} out of range for question {question}")]
    NoSuchOption { question: usize, answer: usize },

    #[error("no stop at index {0}")]
    NoSuchStop(usize),

    #[error("depth {0} is not available for this stop")]
    InvalidDepth(u8),

    #[error("tour already completed")]
    TourCompleted,
}
