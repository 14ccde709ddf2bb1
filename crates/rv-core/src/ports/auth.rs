use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast;

use crate::ports::errors::AuthError;
use crate::session::{AuthSession, AuthUser, SessionChange};

/// Metadata attached to the account at sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpMetadata {
    pub display_name: String,
    pub birth_date: NaiveDate,
}

/// Result of a sign-up.
///
/// `session` is `None` when the backend requires a confirmation step (e.g.
/// an e-mail link); the account then becomes active out-of-band and the
/// change arrives through [`AuthPort::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub session: Option<AuthSession>,
    pub user: AuthUser,
}

#[async_trait]
pub trait AuthPort: Send + Sync {
    /// Session currently known to the backend client, if any.
    async fn get_session(&self) -> Result<Option<AuthSession>, AuthError>;

    /// Stream of session changes. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<SignUpOutcome, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Change the password of the signed-in account.
    async fn update_password(&self, new_password: &str) -> Result<(), AuthError>;
}
