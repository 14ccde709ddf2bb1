//! Token file of the backend client.
//!
//! Holds the access and refresh tokens between runs, next to the session
//! snapshot but separate from it: the snapshot never carries credentials.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use rv_core::{AuthSession, AuthUser};

#[derive(Debug, Serialize, Deserialize)]
struct StoredTokens {
    user: AuthUser,
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
}

impl From<&AuthSession> for StoredTokens {
    fn from(session: &AuthSession) -> Self {
        Self {
            user: session.user.clone(),
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.expires_at,
        }
    }
}

impl From<StoredTokens> for AuthSession {
    fn from(stored: StoredTokens) -> Self {
        AuthSession {
            user: stored.user,
            access_token: stored.access_token,
            refresh_token: stored.refresh_token,
            expires_at: stored.expires_at,
        }
    }
}

pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `Ok(None)` when no tokens were saved, or the file is empty.
    pub async fn load(&self) -> anyhow::Result<Option<AuthSession>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read token file: {}", self.path.display())
                })
            }
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        let stored: StoredTokens =
            serde_json::from_str(&content).context("Failed to parse token file")?;
        Ok(Some(stored.into()))
    }

    pub async fn save(&self, session: &AuthSession) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_vec(&StoredTokens::from(session))?;
        let mut file = fs::File::create(&self.path)
            .await
            .with_context(|| format!("Failed to create token file: {}", self.path.display()))?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        Ok(())
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("Failed to remove token file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rv_core::UserId;
    use tempfile::TempDir;

    fn session() -> AuthSession {
        AuthSession {
            user: AuthUser {
                id: UserId::from("u-1"),
                email: "nova@example.com".to_string(),
                display_name: "nova".to_string(),
            },
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Some(1_750_000_000),
        }
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let file = TokenFile::new(dir.path().join("auth").join("tokens.json"));

        assert_eq!(file.load().await.unwrap(), None);

        file.save(&session()).await.unwrap();
        assert_eq!(file.load().await.unwrap(), Some(session()));

        file.clear().await.unwrap();
        assert_eq!(file.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_garbage_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(TokenFile::new(path).load().await.is_err());
    }
}
