//! Resolved CLI configuration and the stored login.

use std::path::PathBuf;

use buddy_chat::{ChatError, FileStorage, SessionRepository, SessionStorage, StorageRepository};
use buddy_client::TokenResponse;
use buddy_core::ChatSession;

/// Storage key for the tokens saved by `login`.
const AUTH_KEY: &str = "auth";

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub api_url: String,
    /// Token given on the command line or in the environment.
    pub token: Option<String>,
    pub data_dir: PathBuf,
}

impl CliConfig {
    /// Build the config, falling back to the platform data directory.
    pub fn new(
        api_url: String,
        token: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self, String> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => FileStorage::default_location()
                .map(|storage| storage.dir().to_path_buf())
                .ok_or("No data directory available; pass --data-dir")?,
        };
        Ok(Self {
            api_url,
            token: token.filter(|t| !t.is_empty()),
            data_dir,
        })
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(&self.data_dir)
    }

    /// Saved chats, most recent first. Read only; nothing is created.
    pub fn saved_sessions(&self) -> Vec<ChatSession> {
        StorageRepository::new(self.storage()).load()
    }

    /// Remember the tokens from a successful login.
    pub fn save_login(&self, tokens: &TokenResponse) -> Result<(), ChatError> {
        let json = serde_json::to_string_pretty(tokens)?;
        self.storage().write(AUTH_KEY, &json)
    }

    /// Tokens saved by an earlier login, if readable.
    pub fn saved_login(&self) -> Option<TokenResponse> {
        let raw = self.storage().read(AUTH_KEY).ok()??;
        serde_json::from_str(&raw).ok()
    }

    /// Explicit token first, then the saved login.
    pub fn access_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| self.saved_login().map(|t| t.access_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &tempfile::TempDir, token: Option<&str>) -> CliConfig {
        CliConfig::new(
            "http://localhost:8000".to_string(),
            token.map(str::to_string),
            Some(dir.path().to_path_buf()),
        )
        .unwrap()
    }

    #[test]
    fn test_no_token_without_login() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(config(&dir, None).access_token(), None);
        assert_eq!(config(&dir, Some("")).access_token(), None);
    }

    #[test]
    fn test_saved_login_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, None);
        cfg.save_login(&TokenResponse {
            access_token: "saved".to_string(),
            token_type: Some("bearer".to_string()),
            expires_in: None,
            refresh_token: None,
        })
        .unwrap();

        assert_eq!(cfg.access_token().as_deref(), Some("saved"));
        assert!(dir.path().join("auth.json").exists());
    }

    #[test]
    fn test_listing_sessions_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, None);

        assert!(cfg.saved_sessions().is_empty());
        assert!(!dir.path().join("chat_sessions.json").exists());
    }

    #[test]
    fn test_saved_sessions_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir, None);
        let mut session = ChatSession::new("Chat 1");
        session.messages.push(buddy_core::ChatMessage::user("Hi"));
        StorageRepository::new(cfg.storage()).save(&[session]).unwrap();

        let sessions = cfg.saved_sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].title, "Chat 1");
        assert_eq!(sessions[0].messages.len(), 1);
    }

    #[test]
    fn test_explicit_token_wins() {
        let dir = tempfile::tempdir().unwrap();
        config(&dir, None)
            .save_login(&TokenResponse {
                access_token: "saved".to_string(),
                token_type: None,
                expires_in: None,
                refresh_token: None,
            })
            .unwrap();

        assert_eq!(
            config(&dir, Some("flag")).access_token().as_deref(),
            Some("flag")
        );
    }
}
