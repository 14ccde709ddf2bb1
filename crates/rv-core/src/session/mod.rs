//! Session domain models
//!
//! ## Responsibilities / 职责
//!
//! - Identity of the logged-in account (`AuthUser`) and the tokens that back it
//! - The snapshot held by the session context and read by the navigation guard
//! - The subset of that snapshot that survives a restart (`PersistedSession`)
//!
//! Loading state is never persisted: a process always starts in `loading`
//! until the session context has finished initializing.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Identity of an authenticated account as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    /// Chosen at registration and stored in the account metadata.
    pub display_name: String,
}

/// Active session returned by the auth backend.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: AuthUser,
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) at which the access token expires.
    pub expires_at: Option<i64>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Notification pushed by the auth backend for the lifetime of the process.
///
/// Covers logins performed elsewhere (e.g. after an e-mail confirmation),
/// token refreshes and forced sign-outs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    SignedIn(AuthSession),
    TokenRefreshed(AuthSession),
    SignedOut,
}

impl SessionChange {
    /// The session carried by this notification, if any.
    pub fn session(&self) -> Option<&AuthSession> {
        match self {
            SessionChange::SignedIn(session) | SessionChange::TokenRefreshed(session) => {
                Some(session)
            }
            SessionChange::SignedOut => None,
        }
    }
}

/// Authentication status as consumed by the navigation guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthStatus {
    Loading,
    Unauthenticated,
    Authenticated,
}

/// Point-in-time view of the session state.
///
/// Replaced as a whole on every state change; readers never observe a
/// half-updated snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub user: Option<AuthUser>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub accepted_terms: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            loading: true,
            accepted_terms: false,
        }
    }
}

impl SessionSnapshot {
    /// Snapshot at process start, rebuilt from persisted fields.
    ///
    /// Always loading: a restored identity is not trusted until the auth
    /// backend has confirmed it.
    pub fn restored(persisted: PersistedSession) -> Self {
        Self {
            user: persisted.user,
            is_authenticated: persisted.is_authenticated,
            loading: true,
            accepted_terms: persisted.accepted_terms,
        }
    }

    pub fn auth_status(&self) -> AuthStatus {
        if self.loading {
            AuthStatus::Loading
        } else if self.is_authenticated && self.user.is_some() {
            AuthStatus::Authenticated
        } else {
            AuthStatus::Unauthenticated
        }
    }

    pub fn signed_in(&self, user: AuthUser) -> Self {
        Self {
            user: Some(user),
            is_authenticated: true,
            loading: false,
            accepted_terms: self.accepted_terms,
        }
    }

    pub fn signed_out(&self) -> Self {
        Self {
            user: None,
            is_authenticated: false,
            loading: false,
            accepted_terms: self.accepted_terms,
        }
    }

    pub fn with_terms_accepted(&self, accepted_terms: bool) -> Self {
        Self {
            accepted_terms,
            ..self.clone()
        }
    }

    pub fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            user: self.user.clone(),
            is_authenticated: self.is_authenticated,
            accepted_terms: self.accepted_terms,
        }
    }
}

/// Session fields kept across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub accepted_terms: bool,
}
