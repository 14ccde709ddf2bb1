//! Rendezvous client shell.
//!
//! Assembles the core, the use cases and the adapters into a running app.

pub mod bootstrap;
