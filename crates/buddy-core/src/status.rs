//! Turn state machine for a chat session.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a session is within a single user → backend → assistant turn.
///
/// ```text
/// Idle → UserMessageAppended → AwaitingBackend → TypingPlaceholderShown
///      → ResponseNormalized → AssistantMessageAppended → Idle
/// ```
///
/// A resume or job description upload holds the session in `Uploading`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnState {
    /// No turn in flight; input is accepted.
    #[default]
    Idle,
    /// The user's message has been recorded.
    UserMessageAppended,
    /// Waiting for the chat backend to answer.
    AwaitingBackend,
    /// The pending placeholder is the last message of the session.
    TypingPlaceholderShown,
    /// Placeholder removed, display text ready to append.
    ResponseNormalized,
    /// The real assistant message has been appended.
    AssistantMessageAppended,
    /// A document upload is in flight.
    Uploading,
}

impl TurnState {
    /// Returns true if new input may be submitted.
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns true if a turn is in flight.
    pub fn is_busy(&self) -> bool {
        !self.accepts_input()
    }

    /// Returns true if `next` is a legal successor of this state.
    ///
    /// A turn may also enter the typing phase straight from `Idle` (a bare
    /// typing simulation), and any busy state may fall back to `Idle` when
    /// its result is discarded.
    pub fn can_transition_to(&self, next: TurnState) -> bool {
        use TurnState::*;
        match (self, next) {
            (Idle, UserMessageAppended) => true,
            (Idle, TypingPlaceholderShown) => true,
            (Idle, Uploading) => true,
            (UserMessageAppended, AwaitingBackend) => true,
            (AwaitingBackend, TypingPlaceholderShown) => true,
            (TypingPlaceholderShown, ResponseNormalized) => true,
            (ResponseNormalized, AssistantMessageAppended) => true,
            (AssistantMessageAppended, Idle) => true,
            (from, Idle) => from.is_busy(),
            _ => false,
        }
    }
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::UserMessageAppended => "user_message_appended",
            Self::AwaitingBackend => "awaiting_backend",
            Self::TypingPlaceholderShown => "typing_placeholder_shown",
            Self::ResponseNormalized => "response_normalized",
            Self::AssistantMessageAppended => "assistant_message_appended",
            Self::Uploading => "uploading",
        };
        f.write_str(name)
    }
}
