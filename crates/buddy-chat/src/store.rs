//! The session store: owner of all chat sessions and the current pointer.

use std::collections::HashMap;

use buddy_core::{
    ChatMessage, ChatRole, ChatSession, CoreError, MessageId, SessionId, TurnState,
    WELCOME_MESSAGE,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::events::StoreEvent;
use crate::storage::SessionRepository;

const EVENT_CAPACITY: usize = 256;

/// Handle for one in-flight turn.
///
/// Issued by [`SessionStore::begin_turn`] or [`SessionStore::begin_typing`]
/// and consumed by [`SessionStore::complete_turn`] or
/// [`SessionStore::abandon_turn`], so a turn is finished exactly once.
#[derive(Debug)]
pub struct TurnTicket {
    session_id: SessionId,
}

impl TurnTicket {
    /// Session the turn belongs to.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }
}

/// All chat sessions, most recent first, plus the current-session pointer.
///
/// Every mutation is written through the injected [`SessionRepository`].
/// Persistence failures are logged and otherwise ignored.
pub struct SessionStore {
    sessions: Vec<ChatSession>,
    current: Option<SessionId>,
    turns: HashMap<SessionId, TurnState>,
    repository: Box<dyn SessionRepository>,
    events: broadcast::Sender<StoreEvent>,
}

impl SessionStore {
    /// Load sessions from `repository`, creating a first one if none exist.
    pub fn open(repository: impl SessionRepository + 'static) -> Self {
        let sessions = repository.load();
        info!(count = sessions.len(), "Loaded chat sessions");

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let current = sessions.first().map(|s| s.id.clone());
        let mut store = Self {
            sessions,
            current,
            turns: HashMap::new(),
            repository: Box::new(repository),
            events,
        };
        if store.sessions.is_empty() {
            store.create_session();
        }
        store
    }

    /// Receive change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// All sessions, most recent first.
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn session(&self, id: &SessionId) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    pub fn current_session_id(&self) -> Option<&SessionId> {
        self.current.as_ref()
    }

    pub fn current_session(&self) -> Option<&ChatSession> {
        self.current.as_ref().and_then(|id| self.session(id))
    }

    /// Messages of the current session, or nothing if none is selected.
    pub fn messages(&self) -> &[ChatMessage] {
        self.current_session()
            .map(|s| s.messages.as_slice())
            .unwrap_or_default()
    }

    pub fn is_current(&self, id: &SessionId) -> bool {
        self.current.as_ref() == Some(id)
    }

    /// Turn state of a session. Unknown sessions are idle.
    pub fn turn_state(&self, id: &SessionId) -> TurnState {
        self.turns.get(id).copied().unwrap_or_default()
    }

    /// Returns true if the current session accepts new input.
    pub fn can_submit(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|id| self.turn_state(id).accepts_input())
    }

    /// Start a new, empty session at the head of the list and make it current.
    pub fn create_session(&mut self) -> ChatSession {
        let session = ChatSession::new(format!("Chat {}", self.sessions.len() + 1));
        info!(session_id = %session.id, title = %session.title, "Created chat session");

        self.sessions.insert(0, session.clone());
        self.current = Some(session.id.clone());
        self.emit(StoreEvent::SessionCreated(session.id.clone()));
        self.emit(StoreEvent::SessionSelected(session.id.clone()));
        self.persist();
        session
    }

    /// Make `id` the current session.
    ///
    /// Unknown ids leave the pointer unchanged and return false.
    pub fn select_session(&mut self, id: &SessionId) -> bool {
        if self.session(id).is_none() {
            debug!(session_id = %id, "Ignoring selection of unknown session");
            return false;
        }
        if !self.is_current(id) {
            self.current = Some(id.clone());
            self.emit(StoreEvent::SessionSelected(id.clone()));
        }
        true
    }

    /// Remove a session. If it was current, the head of the list becomes
    /// current; a fresh session is created when none remain.
    pub fn delete_session(&mut self, id: &SessionId) -> bool {
        let Some(index) = self.sessions.iter().position(|s| &s.id == id) else {
            return false;
        };
        self.sessions.remove(index);
        self.turns.remove(id);
        info!(session_id = %id, "Deleted chat session");
        self.emit(StoreEvent::SessionDeleted(id.clone()));

        if self.is_current(id) {
            match self.sessions.first().map(|s| s.id.clone()) {
                Some(next) => {
                    self.current = Some(next.clone());
                    self.emit(StoreEvent::SessionSelected(next));
                }
                None => {
                    self.current = None;
                    // create_session persists.
                    self.create_session();
                    return true;
                }
            }
        }
        self.persist();
        true
    }

    /// Append a message to the current session.
    pub fn append_message(
        &mut self,
        role: ChatRole,
        content: impl Into<String>,
    ) -> Result<MessageId, CoreError> {
        let id = self.current.clone().ok_or(CoreError::NoCurrentSession)?;
        self.append_message_to(&id, role, content)
    }

    /// Append a message to a specific session.
    ///
    /// Refused while a turn is in flight, so nothing lands between a user
    /// message and its reply, or after the typing placeholder.
    pub fn append_message_to(
        &mut self,
        id: &SessionId,
        role: ChatRole,
        content: impl Into<String>,
    ) -> Result<MessageId, CoreError> {
        self.ensure_idle(id)?;
        let message_id = self.push(id, ChatMessage::new(role, content))?;
        self.persist();
        Ok(message_id)
    }

    /// Clear the current session and seed the welcome message.
    pub fn reset_current_session(&mut self) -> Result<(), CoreError> {
        let id = self.current.clone().ok_or(CoreError::NoCurrentSession)?;
        self.ensure_idle(&id)?;
        let session = self.session_mut(&id)?;
        session.messages.clear();
        session.messages.push(ChatMessage::assistant(WELCOME_MESSAGE));
        self.emit(StoreEvent::SessionReset(id));
        self.persist();
        Ok(())
    }

    /// Record that a resume was uploaded in `id`.
    pub fn mark_resume_attached(&mut self, id: &SessionId) -> Result<(), CoreError> {
        self.session_mut(id)?.resume_attached = true;
        self.persist();
        Ok(())
    }

    /// Record the job description the session targets.
    pub fn set_job_description(
        &mut self,
        id: &SessionId,
        description: impl Into<String>,
    ) -> Result<(), CoreError> {
        self.session_mut(id)?.job_description = Some(description.into());
        self.persist();
        Ok(())
    }

    /// Start a turn in the current session by recording the user's message.
    ///
    /// Leaves the session in `AwaitingBackend`.
    pub fn begin_turn(&mut self, content: &str) -> Result<TurnTicket, CoreError> {
        if content.trim().is_empty() {
            return Err(CoreError::EmptyMessage);
        }
        let id = self.current.clone().ok_or(CoreError::NoCurrentSession)?;
        self.ensure_idle(&id)?;

        self.push(&id, ChatMessage::user(content))?;
        self.transition(&id, TurnState::UserMessageAppended)?;
        self.transition(&id, TurnState::AwaitingBackend)?;
        self.persist();
        Ok(TurnTicket { session_id: id })
    }

    /// Start a bare typing simulation in the current session.
    ///
    /// Shows the placeholder immediately; finish with [`Self::complete_turn`].
    pub fn begin_typing(&mut self) -> Result<TurnTicket, CoreError> {
        let id = self.current.clone().ok_or(CoreError::NoCurrentSession)?;
        self.ensure_idle(&id)?;
        self.push(&id, ChatMessage::pending_placeholder())?;
        self.transition(&id, TurnState::TypingPlaceholderShown)?;
        Ok(TurnTicket { session_id: id })
    }

    /// Show the typing placeholder once the backend has answered.
    pub fn show_typing(&mut self, ticket: &TurnTicket) -> Result<(), CoreError> {
        let id = &ticket.session_id;
        self.check_transition(id, TurnState::TypingPlaceholderShown)?;
        self.push(id, ChatMessage::pending_placeholder())?;
        self.transition(id, TurnState::TypingPlaceholderShown)
    }

    /// Replace the placeholder with the real reply and return to idle.
    ///
    /// The placeholder is removed before the reply is appended, never edited.
    pub fn complete_turn(
        &mut self,
        ticket: TurnTicket,
        content: impl Into<String>,
    ) -> Result<MessageId, CoreError> {
        let id = ticket.session_id;
        self.check_transition(&id, TurnState::ResponseNormalized)?;

        self.remove_pending(&id)?;
        self.transition(&id, TurnState::ResponseNormalized)?;
        let message_id = self.push(&id, ChatMessage::assistant(content))?;
        self.transition(&id, TurnState::AssistantMessageAppended)?;
        self.transition(&id, TurnState::Idle)?;
        self.persist();
        Ok(message_id)
    }

    /// Drop a turn without a reply. Removes any placeholder and returns the
    /// session to idle; a no-op if the session has been deleted.
    pub fn abandon_turn(&mut self, ticket: TurnTicket) {
        let id = ticket.session_id;
        if self.session(&id).is_none() {
            self.turns.remove(&id);
            return;
        }
        if let Err(e) = self.remove_pending(&id) {
            warn!(session_id = %id, error = %e, "Failed to clear placeholder");
        }
        if self.turn_state(&id).is_busy() {
            self.turns.remove(&id);
            self.emit(StoreEvent::TurnStateChanged {
                session_id: id.clone(),
                state: TurnState::Idle,
            });
        }
        info!(session_id = %id, "Abandoned turn");
    }

    /// Hold the current session busy while a document upload is in flight.
    pub fn begin_upload(&mut self) -> Result<TurnTicket, CoreError> {
        let id = self.current.clone().ok_or(CoreError::NoCurrentSession)?;
        self.ensure_idle(&id)?;
        self.transition(&id, TurnState::Uploading)?;
        Ok(TurnTicket { session_id: id })
    }

    /// Return a session held by [`Self::begin_upload`] to idle.
    pub fn finish_upload(&mut self, ticket: TurnTicket) {
        let id = ticket.session_id;
        if self.turn_state(&id) != TurnState::Uploading {
            return;
        }
        self.turns.remove(&id);
        debug!(session_id = %id, "Upload finished");
        self.emit(StoreEvent::TurnStateChanged {
            session_id: id,
            state: TurnState::Idle,
        });
    }

    fn session_mut(&mut self, id: &SessionId) -> Result<&mut ChatSession, CoreError> {
        self.sessions
            .iter_mut()
            .find(|s| &s.id == id)
            .ok_or_else(|| CoreError::SessionNotFound(id.to_string()))
    }

    fn ensure_idle(&self, id: &SessionId) -> Result<(), CoreError> {
        if self.session(id).is_none() {
            return Err(CoreError::SessionNotFound(id.to_string()));
        }
        let state = self.turn_state(id);
        if state.is_busy() {
            return Err(CoreError::TurnInProgress {
                session: id.to_string(),
                state,
            });
        }
        Ok(())
    }

    fn check_transition(&self, id: &SessionId, next: TurnState) -> Result<(), CoreError> {
        if self.session(id).is_none() {
            return Err(CoreError::SessionNotFound(id.to_string()));
        }
        let from = self.turn_state(id);
        if !from.can_transition_to(next) {
            return Err(CoreError::InvalidTurnTransition { from, to: next });
        }
        Ok(())
    }

    fn transition(&mut self, id: &SessionId, next: TurnState) -> Result<(), CoreError> {
        self.check_transition(id, next)?;
        if next == TurnState::Idle {
            self.turns.remove(id);
        } else {
            self.turns.insert(id.clone(), next);
        }
        debug!(session_id = %id, state = %next, "Turn state changed");
        self.emit(StoreEvent::TurnStateChanged {
            session_id: id.clone(),
            state: next,
        });
        Ok(())
    }

    fn push(&mut self, id: &SessionId, message: ChatMessage) -> Result<MessageId, CoreError> {
        let message_id = message.id.clone();
        let pending = message.pending;
        self.session_mut(id)?.messages.push(message);
        self.emit(StoreEvent::MessageAppended {
            session_id: id.clone(),
            message_id: message_id.clone(),
            pending,
        });
        Ok(message_id)
    }

    fn remove_pending(&mut self, id: &SessionId) -> Result<(), CoreError> {
        if self.session_mut(id)?.remove_pending() {
            self.emit(StoreEvent::PendingRemoved {
                session_id: id.clone(),
            });
        }
        Ok(())
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine.
        self.events.send(event).ok();
    }

    fn persist(&self) {
        if let Err(e) = self.repository.save(&self.sessions) {
            warn!(error = %e, "Failed to persist chat sessions");
        }
    }
}
