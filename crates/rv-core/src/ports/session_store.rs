//! Session persistence port
//!
//! Stores the persisted subset of the session snapshot (identity,
//! authenticated flag, terms acceptance). Implementations live in the
//! infrastructure layer. Sign-out saves a signed-out snapshot, so stored
//! terms acceptance outlives the session.

use async_trait::async_trait;

use crate::ports::errors::SessionStoreError;
use crate::session::PersistedSession;

#[async_trait]
pub trait SessionStorePort: Send + Sync {
    /// Returns the default (empty) session when nothing was stored yet.
    async fn load(&self) -> Result<PersistedSession, SessionStoreError>;

    async fn save(&self, session: &PersistedSession) -> Result<(), SessionStoreError>;
}
