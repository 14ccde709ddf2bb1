use thiserror::Error;

/// Errors from the authentication backend.
///
/// Returned to the form that triggered the call; only passive session
/// initialization swallows them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid login credentials")]
    InvalidCredentials,

    #[error("email address not confirmed")]
    EmailNotConfirmed,

    #[error("user already registered")]
    UserAlreadyExists,

    #[error("no active session")]
    NotAuthenticated,

    #[error("auth backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("auth transport error: {0}")]
    Transport(String),
}

/// Errors from row reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("session store failed: {0}")]
    Store(String),

    #[error("session data corrupt: {0}")]
    Corrupt(String),
}
