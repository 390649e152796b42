//! Chat message and session types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{MessageId, SessionId};

/// Greeting seeded into a session when it is reset.
pub const WELCOME_MESSAGE: &str = "Hi! I'm your Interview Buddy AI. Upload your resume and provide a job description to get started with personalized interview questions.";

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// User message (input/prompt).
    User,
    /// Assistant message (response).
    Assistant,
}

/// A message in a session's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique message identifier.
    pub id: MessageId,
    /// Role of this message.
    pub role: ChatRole,
    /// Message content. Always empty for a pending placeholder.
    pub content: String,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
    /// Marks the transient "assistant is typing" placeholder.
    #[serde(default)]
    pub pending: bool,
}

impl ChatMessage {
    /// Create a new chat message.
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            role,
            content: content.into(),
            created_at: Utc::now(),
            pending: false,
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    /// Create the empty assistant placeholder shown while a reply is pending.
    pub fn pending_placeholder() -> Self {
        Self {
            pending: true,
            ..Self::new(ChatRole::Assistant, String::new())
        }
    }
}

/// One independent conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Unique session identifier.
    pub id: SessionId,

    /// Display label, e.g. "Chat 3".
    pub title: String,

    /// Messages in conversation order.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// Whether a resume has been uploaded in this session.
    #[serde(default)]
    pub resume_attached: bool,

    /// Job description provided for this session, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
}

impl ChatSession {
    /// Create an empty session.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: SessionId::generate(),
            title: title.into(),
            messages: Vec::new(),
            created_at: Utc::now(),
            resume_attached: false,
            job_description: None,
        }
    }

    /// Builder method to set a specific ID (useful for testing).
    pub fn with_id(mut self, id: SessionId) -> Self {
        self.id = id;
        self
    }

    /// Get the most recent message, if any.
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Position of the pending placeholder, if one is shown.
    pub fn pending_index(&self) -> Option<usize> {
        self.messages.iter().position(|m| m.pending)
    }

    /// Check if a pending placeholder is currently shown.
    pub fn has_pending(&self) -> bool {
        self.pending_index().is_some()
    }

    /// Remove the pending placeholder. Returns true if one was present.
    pub fn remove_pending(&mut self) -> bool {
        let before = self.messages.len();
        self.messages.retain(|m| !m.pending);
        self.messages.len() != before
    }

    /// Copy of this session without any pending placeholder, for persistence.
    pub fn without_pending(&self) -> Self {
        let mut session = self.clone();
        session.remove_pending();
        session
    }
}
