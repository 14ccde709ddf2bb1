//! Port interfaces for the application layer
//!
//! Ports define the contract between the use cases and the infrastructure
//! (the hosted backend, local persistence, the UI router). The core never
//! talks to any of them directly.

pub mod auth;
mod clock;
pub mod errors;
mod navigator;
pub mod posts;
pub mod records;
pub mod session_store;

pub use auth::{AuthPort, SignUpMetadata, SignUpOutcome};
pub use clock::*;
pub use errors::{AuthError, FetchError, SessionStoreError};
pub use navigator::NavigatorPort;
pub use posts::PostsPort;
pub use records::{PreferencesRepositoryPort, ProfileRepositoryPort};
pub use session_store::SessionStorePort;
