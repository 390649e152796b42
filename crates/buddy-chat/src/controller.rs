//! Drives chat turns against the backend.
//!
//! The controller owns the store behind an async mutex. The lock is only held
//! for synchronous store updates, never across the backend call or the typing
//! delay, so other sessions stay usable while a turn is in flight.

use std::sync::Arc;

use buddy_client::{ClientError, InterviewBackend, ResumeUpload};
use buddy_core::{normalize, ChatRole, ChatSession, MessageId, SessionId};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::config::{ChatConfig, StaleTurnPolicy};
use crate::error::ChatError;
use crate::pacer::{FixedDelayPacer, ResponsePacer};
use crate::store::{SessionStore, TurnTicket};

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The reply was appended to the session.
    Delivered {
        session_id: SessionId,
        message_id: MessageId,
    },
    /// The reply was dropped because the session is no longer current
    /// (or no longer exists).
    Discarded { session_id: SessionId },
}

/// Runs user → backend → assistant turns on top of a [`SessionStore`].
pub struct ChatController<B: ?Sized> {
    store: Arc<Mutex<SessionStore>>,
    backend: Arc<B>,
    pacer: Arc<dyn ResponsePacer>,
    config: ChatConfig,
}

impl<B: InterviewBackend + ?Sized> ChatController<B> {
    /// Create a controller pacing replies with a fixed typing delay.
    pub fn new(store: SessionStore, backend: Arc<B>, config: ChatConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            backend,
            pacer: Arc::new(FixedDelayPacer::new(config.typing_delay)),
            config,
        }
    }

    /// Builder method to replace the reply pacer.
    pub fn with_pacer(mut self, pacer: Arc<dyn ResponsePacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Shared handle to the store, for rendering.
    pub fn store(&self) -> Arc<Mutex<SessionStore>> {
        Arc::clone(&self.store)
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub async fn create_session(&self) -> ChatSession {
        self.store.lock().await.create_session()
    }

    pub async fn select_session(&self, id: &SessionId) -> bool {
        self.store.lock().await.select_session(id)
    }

    pub async fn delete_session(&self, id: &SessionId) -> bool {
        self.store.lock().await.delete_session(id)
    }

    pub async fn append_message(
        &self,
        role: ChatRole,
        content: impl Into<String>,
    ) -> Result<MessageId, ChatError> {
        Ok(self.store.lock().await.append_message(role, content)?)
    }

    pub async fn reset_current_session(&self) -> Result<(), ChatError> {
        Ok(self.store.lock().await.reset_current_session()?)
    }

    /// End the typing delay of any turn currently waiting on it.
    pub fn skip_typing(&self) {
        self.pacer.skip();
    }

    /// Show the typing placeholder in the current session, wait, then
    /// append `text` as the assistant's reply.
    pub async fn simulate_typing(&self, text: impl Into<String>) -> Result<TurnOutcome, ChatError> {
        let ticket = self.store.lock().await.begin_typing()?;
        self.reveal(ticket, text.into()).await
    }

    /// Run one full turn for `text` in the current session.
    ///
    /// Backend failures do not surface as errors: they become the assistant's
    /// reply and the session still returns to idle. Errors are only returned
    /// when the turn could not start (empty text, turn already in flight).
    #[instrument(skip(self, text), fields(len = text.len()))]
    pub async fn send_message(&self, text: &str) -> Result<TurnOutcome, ChatError> {
        let ticket = self.store.lock().await.begin_turn(text)?;
        info!(session_id = %ticket.session_id(), "Turn started");

        let reply = match tokio::time::timeout(self.config.request_timeout, self.backend.chat(text)).await {
            Ok(Ok(payload)) => normalize(&payload),
            Ok(Err(e)) => {
                warn!(error = %e, "Chat request failed");
                e.chat_display_message()
            }
            Err(_) => {
                warn!(timeout_ms = self.config.request_timeout.as_millis() as u64, "Chat request timed out");
                ClientError::Timeout.chat_display_message()
            }
        };

        {
            let mut store = self.store.lock().await;
            if self.is_stale(&store, &ticket) {
                return Ok(Self::discard(&mut store, ticket));
            }
            if let Err(e) = store.show_typing(&ticket) {
                store.abandon_turn(ticket);
                return Err(e.into());
            }
        }
        self.reveal(ticket, reply).await
    }

    /// Upload a resume and record it in the current session's history.
    ///
    /// The session refuses other input until the upload has finished.
    pub async fn upload_resume(&self, upload: ResumeUpload) -> Result<String, ChatError> {
        let ticket = self.store.lock().await.begin_upload()?;
        let result = self.backend.upload_resume(&upload).await;

        let mut store = self.store.lock().await;
        let session_id = ticket.session_id().clone();
        store.finish_upload(ticket);
        let reply = result?;

        store.append_message_to(
            &session_id,
            ChatRole::User,
            format!("📄 Uploaded resume: {}", upload.file_name),
        )?;
        store.append_message_to(&session_id, ChatRole::Assistant, reply.clone())?;
        store.mark_resume_attached(&session_id)?;
        Ok(reply)
    }

    /// Submit a job description and record it in the current session.
    pub async fn upload_job_description(&self, description: &str) -> Result<String, ChatError> {
        let ticket = self.store.lock().await.begin_upload()?;
        let result = self.backend.upload_job_description(description).await;

        let mut store = self.store.lock().await;
        let session_id = ticket.session_id().clone();
        store.finish_upload(ticket);
        let reply = result?;

        store.append_message_to(&session_id, ChatRole::User, "📋 Job description provided")?;
        store.append_message_to(&session_id, ChatRole::Assistant, reply.clone())?;
        store.set_job_description(&session_id, description.trim())?;
        Ok(reply)
    }

    async fn reveal(&self, ticket: TurnTicket, text: String) -> Result<TurnOutcome, ChatError> {
        self.pacer.pace(&text).await;

        let mut store = self.store.lock().await;
        if self.is_stale(&store, &ticket) {
            return Ok(Self::discard(&mut store, ticket));
        }
        let session_id = ticket.session_id().clone();
        let message_id = store.complete_turn(ticket, text)?;
        Ok(TurnOutcome::Delivered {
            session_id,
            message_id,
        })
    }

    fn is_stale(&self, store: &SessionStore, ticket: &TurnTicket) -> bool {
        let id = ticket.session_id();
        if store.session(id).is_none() {
            return true;
        }
        !store.is_current(id) && self.config.stale_turn_policy == StaleTurnPolicy::Discard
    }

    fn discard(store: &mut SessionStore, ticket: TurnTicket) -> TurnOutcome {
        let session_id = ticket.session_id().clone();
        info!(session_id = %session_id, "Discarding reply for session that is no longer current");
        store.abandon_turn(ticket);
        TurnOutcome::Discarded { session_id }
    }
}
