//! File-based session store
//!
//! Persists the session snapshot fields that survive a restart to a local
//! JSON file in the application data directory.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use rv_core::ports::{SessionStoreError, SessionStorePort};
use rv_core::session::PersistedSession;

pub const DEFAULT_SESSION_FILE: &str = "session.json";

pub struct FileSessionStore {
    session_file_path: PathBuf,
}

impl FileSessionStore {
    /// Create store with custom file path
    pub fn new(session_file_path: PathBuf) -> Self {
        Self { session_file_path }
    }

    /// Create store with defaults
    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self {
            session_file_path: base_dir.join(DEFAULT_SESSION_FILE),
        }
    }

    async fn ensure_parent_dir(&self) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.session_file_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SessionStoreError::Store(format!("create dir: {e}")))?;
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStorePort for FileSessionStore {
    async fn load(&self) -> Result<PersistedSession, SessionStoreError> {
        let content = match fs::read_to_string(&self.session_file_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedSession::default())
            }
            Err(e) => return Err(SessionStoreError::Store(format!("read: {e}"))),
        };

        if content.trim().is_empty() {
            return Ok(PersistedSession::default());
        }

        serde_json::from_str(&content).map_err(|e| SessionStoreError::Corrupt(e.to_string()))
    }

    async fn save(&self, session: &PersistedSession) -> Result<(), SessionStoreError> {
        self.ensure_parent_dir().await?;

        let json = serde_json::to_string_pretty(session)
            .map_err(|e| SessionStoreError::Store(format!("serialize: {e}")))?;

        let mut file = fs::File::create(&self.session_file_path)
            .await
            .map_err(|e| SessionStoreError::Store(format!("create: {e}")))?;
        file.write_all(json.as_bytes())
            .await
            .map_err(|e| SessionStoreError::Store(format!("write: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| SessionStoreError::Store(format!("sync: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rv_core::{AuthUser, UserId};
    use tempfile::TempDir;

    fn persisted() -> PersistedSession {
        PersistedSession {
            user: Some(AuthUser {
                id: UserId::from("u-1"),
                email: "lea@example.com".to_string(),
                display_name: "lea".to_string(),
            }),
            is_authenticated: true,
            accepted_terms: true,
        }
    }

    #[tokio::test]
    async fn test_load_returns_default_when_file_not_exists() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("missing.json"));

        assert_eq!(store.load().await.unwrap(), PersistedSession::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::with_defaults(temp_dir.path().join("nested"));

        store.save(&persisted()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), persisted());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = FileSessionStore::new(path);

        assert!(matches!(
            store.load().await,
            Err(SessionStoreError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_signed_out_save_replaces_previous_session() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(temp_dir.path().join("session.json"));
        store.save(&persisted()).await.unwrap();

        let signed_out = PersistedSession {
            user: None,
            is_authenticated: false,
            accepted_terms: true,
        };
        store.save(&signed_out).await.unwrap();

        assert_eq!(store.load().await.unwrap(), signed_out);
    }
}
