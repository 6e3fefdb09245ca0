//! tracker-server
//!
//! Multi-client async TCP relay for the shared map tracker.

pub mod config;
pub mod types;
pub mod server;

// these are internal modules, not re-exported
mod client;
mod relay_task;
