//! Rendezvous application orchestration layer
//!
//! Use cases and runtime orchestration: the session context, the record
//! query cache, the navigation guard runner and the screen use cases.

pub mod app;
pub mod deps;
pub mod guard;
pub mod query;
pub mod records;
pub mod session;
pub mod usecases;

#[cfg(test)]
pub(crate) mod testing;

pub use app::App;
pub use deps::AppDeps;
pub use guard::NavigationGuard;
pub use query::{QueryCell, QueryOptions};
pub use records::{RecordsLoader, UserRecords};
pub use session::{
    ChangePasswordError, ObserverId, RegisterError, RegistrationOutcome, SessionContext,
    SessionObserver,
};
