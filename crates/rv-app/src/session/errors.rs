use rv_core::ports::{AuthError, FetchError};
use rv_core::validation::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("invalid registration: {0}")]
    Validation(#[from] ValidationError),
    #[error("sign up failed: {0}")]
    Auth(#[from] AuthError),
    #[error("profile creation failed: {0}")]
    Profile(#[from] FetchError),
}

#[derive(Debug, thiserror::Error)]
pub enum ChangePasswordError {
    #[error("invalid password: {0}")]
    Validation(#[from] ValidationError),
    #[error("password update failed: {0}")]
    Auth(#[from] AuthError),
}
