//! Runtime layer for the sales dashboard.
//!
//! Owns the reload cycle: loading the source file, rebuilding the report and
//! handing fresh snapshots to the UI over a channel.

pub mod data_manager;
pub mod orchestrator;

pub use dashboard_core as core;
pub use dashboard_data as data;
