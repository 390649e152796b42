//! Change notifications emitted by the session store.

use buddy_core::{MessageId, SessionId, TurnState};

/// Something changed in the store; UIs re-render from the store on receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    SessionCreated(SessionId),
    SessionSelected(SessionId),
    SessionDeleted(SessionId),
    /// Messages cleared and the welcome message re-seeded.
    SessionReset(SessionId),
    /// A message (possibly the pending placeholder) was appended.
    MessageAppended {
        session_id: SessionId,
        message_id: MessageId,
        pending: bool,
    },
    /// The pending placeholder was taken out of the session.
    PendingRemoved { session_id: SessionId },
    TurnStateChanged {
        session_id: SessionId,
        state: TurnState,
    },
}

impl StoreEvent {
    /// Returns true if the view should scroll to the newest message.
    pub fn scrolls_to_latest(&self) -> bool {
        matches!(self, Self::MessageAppended { .. } | Self::SessionReset(_))
    }
}
