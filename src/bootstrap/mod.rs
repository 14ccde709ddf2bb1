pub mod config;
pub mod run;
pub mod tracing;
pub mod wiring;

pub use config::resolve_config;
pub use run::{create_runtime, run_app};
pub use wiring::{wire_app, LoggingNavigator, WiringError};
