//! Chat sessions for Interview Buddy
//!
//! This crate owns the client-side conversation state: the list of sessions,
//! the per-session turn state machine, persistence through a storage port,
//! and the controller that drives a turn against the backend.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use buddy_chat::{ChatConfig, ChatController, FileStorage, SessionStore, StorageRepository};
//! use buddy_client::BackendClient;
//!
//! async fn ask() -> Result<(), Box<dyn std::error::Error>> {
//!     let storage = FileStorage::default_location().ok_or("no data directory")?;
//!     let store = SessionStore::open(StorageRepository::new(storage));
//!     let backend = Arc::new(BackendClient::new("http://localhost:8000").with_token("token"));
//!
//!     let controller = ChatController::new(store, backend, ChatConfig::default());
//!     controller.send_message("What should I expect in a system design round?").await?;
//!
//!     let store = controller.store();
//!     for message in store.lock().await.messages() {
//!         println!("{:?}: {}", message.role, message.content);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod controller;
mod error;
mod events;
mod pacer;
mod storage;
mod store;

pub use config::{ChatConfig, StaleTurnPolicy};
pub use controller::{ChatController, TurnOutcome};
pub use error::ChatError;
pub use events::StoreEvent;
pub use pacer::{FixedDelayPacer, PaceOutcome, ResponsePacer, DEFAULT_TYPING_DELAY};
pub use storage::{
    FileStorage, MemoryStorage, SessionRepository, SessionStorage, StorageRepository,
    SESSIONS_KEY,
};
pub use store::{SessionStore, TurnTicket};
