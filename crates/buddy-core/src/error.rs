//! Core domain errors.

use thiserror::Error;

use crate::status::TurnState;

/// Core domain errors for Interview Buddy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Session not found.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// No session is currently selected.
    #[error("No current session")]
    NoCurrentSession,

    /// A turn is already in flight for the session.
    #[error("Session '{session}' is busy ({state})")]
    TurnInProgress { session: String, state: TurnState },

    /// Invalid turn state transition.
    #[error("Invalid turn transition: {from} -> {to}")]
    InvalidTurnTransition { from: TurnState, to: TurnState },

    /// Message text was empty after trimming.
    #[error("Message is empty")]
    EmptyMessage,
}
