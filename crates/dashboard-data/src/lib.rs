//! Data layer for the sales dashboard.
//!
//! Reads spreadsheets into a [`dashboard_core::models::Dataset`], runs the
//! aggregation pipeline over it and assembles the per-view report consumed by
//! the terminal UI and the JSON output.

pub mod pipeline;
pub mod reader;
pub mod report;

pub use dashboard_core as core;
