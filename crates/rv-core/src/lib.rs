//! # rv-core
//!
//! Core domain models and navigation rules for the Rendezvous client.
//!
//! This crate contains pure logic without any infrastructure dependencies:
//! the session and record models, the profile completeness guard, form
//! validation and the port traits implemented by the outer layers.

pub mod config;
pub mod feed;
pub mod guard;
pub mod ids;
pub mod optimistic;
pub mod ports;
pub mod preferences;
pub mod profile;
pub mod remote;
pub mod routes;
pub mod session;
pub mod validation;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use guard::{CompletenessGuard, Destination, GuardDecision, GuardInput, Location, RetryPrompt};
pub use ids::{PostId, UserId};
pub use preferences::Preferences;
pub use profile::{Gate, Gender, Profile};
pub use remote::{FetchFailure, Remote};
pub use routes::RouteTable;
pub use session::{AuthSession, AuthStatus, AuthUser, SessionChange, SessionSnapshot};
