//! Persistence port for chat sessions.
//!
//! Sessions are stored as one JSON document under a fixed key in a simple
//! key/value [`SessionStorage`]. Loading never fails: missing or corrupt data
//! is treated as "no sessions yet".

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use buddy_core::ChatSession;
use tracing::{debug, warn};

use crate::error::ChatError;

/// Key under which the session list is stored.
pub const SESSIONS_KEY: &str = "chat_sessions";

const APP_DIR: &str = "interview-buddy";

/// Minimal key/value storage.
pub trait SessionStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, ChatError>;
    fn write(&self, key: &str, value: &str) -> Result<(), ChatError>;
}

impl<S: SessionStorage + ?Sized> SessionStorage for Arc<S> {
    fn read(&self, key: &str) -> Result<Option<String>, ChatError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), ChatError> {
        (**self).write(key, value)
    }
}

/// In-process storage, mainly for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to pre-populate a key.
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
        self
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, ChatError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), ChatError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by one `<key>.json` file per key in a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/interview-buddy`, if the platform has a data directory.
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join(APP_DIR)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SessionStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, ChatError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), ChatError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write then rename so a crash never leaves a truncated document.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = value.len(), "Wrote storage entry");
        Ok(())
    }
}

/// Loads and saves the session list.
pub trait SessionRepository: Send + Sync {
    /// All stored sessions, most recent first. Never fails.
    fn load(&self) -> Vec<ChatSession>;

    /// Replace the stored session list.
    fn save(&self, sessions: &[ChatSession]) -> Result<(), ChatError>;
}

/// [`SessionRepository`] serializing the list as JSON into a [`SessionStorage`].
pub struct StorageRepository<S> {
    storage: S,
    key: String,
}

impl<S: SessionStorage> StorageRepository<S> {
    /// Repository using the standard [`SESSIONS_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, SESSIONS_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }
}

impl<S: SessionStorage> SessionRepository for StorageRepository<S> {
    fn load(&self) -> Vec<ChatSession> {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read stored sessions, starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<ChatSession>>(&raw) {
            Ok(sessions) => sessions.iter().map(ChatSession::without_pending).collect(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Stored sessions are corrupt, discarding");
                Vec::new()
            }
        }
    }

    fn save(&self, sessions: &[ChatSession]) -> Result<(), ChatError> {
        let sessions: Vec<ChatSession> = sessions.iter().map(ChatSession::without_pending).collect();
        let json = serde_json::to_string(&sessions)?;
        self.storage.write(&self.key, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use buddy_core::ChatMessage;

    fn sample_session() -> ChatSession {
        let mut session = ChatSession::new("Chat 1");
        session.messages.push(ChatMessage::user("hello"));
        session.messages.push(ChatMessage::assistant("hi there"));
        session
    }

    #[test]
    fn test_missing_data_loads_empty() {
        let repo = StorageRepository::new(MemoryStorage::new());
        assert!(repo.load().is_empty());
    }

    #[test]
    fn test_truncated_json_loads_empty() {
        let storage = MemoryStorage::new().with_entry(SESSIONS_KEY, r#"[{"id":"a","title":"Chat 1","mess"#);
        let repo = StorageRepository::new(storage);
        assert!(repo.load().is_empty());
    }

    #[test]
    fn test_wrong_shape_loads_empty() {
        let storage = MemoryStorage::new().with_entry(SESSIONS_KEY, r#"{"not": "a list"}"#);
        assert!(StorageRepository::new(storage).load().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let repo = StorageRepository::new(MemoryStorage::new());
        let session = sample_session();
        repo.save(std::slice::from_ref(&session)).unwrap();

        assert_eq!(repo.load(), vec![session]);
    }

    #[test]
    fn test_pending_placeholder_not_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let repo = StorageRepository::new(Arc::clone(&storage));
        let mut session = sample_session();
        session.messages.push(ChatMessage::pending_placeholder());

        repo.save(&[session]).unwrap();

        let raw = storage.read(SESSIONS_KEY).unwrap().unwrap();
        assert!(!raw.contains("\"pending\":true"));
        assert_eq!(repo.load()[0].messages.len(), 2);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.read(SESSIONS_KEY).unwrap(), None);
        storage.write(SESSIONS_KEY, "[]").unwrap();
        assert_eq!(storage.read(SESSIONS_KEY).unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested").join("chat_sessions.json").exists());
    }

    #[test]
    fn test_file_storage_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("chat_sessions.json"), "{{{").unwrap();

        let repo = StorageRepository::new(FileStorage::new(dir.path()));
        assert!(repo.load().is_empty());
    }
}
