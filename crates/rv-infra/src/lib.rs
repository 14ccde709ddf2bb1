//! Adapters for the Rendezvous client: the hosted backend over HTTP, the
//! session file, the system clock and configuration loading.

pub mod backend;
pub mod config;
pub mod fs;
pub mod session_store;
pub mod time;

pub use backend::{BackendClient, BackendSettings};
pub use session_store::FileSessionStore;
pub use time::SystemClock;
