//! Job control for an interactive session, and a watchdog that kills the
//! descendants of a process once it exits.

pub mod app;
pub mod error;
pub mod manager;
pub mod models;
pub mod monitor;
pub mod worker;
