//! Interview Buddy Core Domain Types
//!
//! This crate contains pure domain types with no dependencies on:
//! - Network/HTTP
//! - Storage backends
//! - Runtime specifics
//!
//! All types here represent the chat domain: sessions, messages, the
//! per-session turn state machine and the backend response normalizer.

pub mod chat;
pub mod error;
pub mod ids;
pub mod normalize;
pub mod status;

// Re-export commonly used types
pub use chat::{ChatMessage, ChatRole, ChatSession, WELCOME_MESSAGE};
pub use error::CoreError;
pub use ids::{MessageId, SessionId};
pub use normalize::{is_truthy, normalize, normalize_str, normalize_with_depth, MAX_NORMALIZE_DEPTH};
pub use status::TurnState;
