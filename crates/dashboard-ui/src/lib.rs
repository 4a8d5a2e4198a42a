//! Terminal UI layer for the sales dashboard.
//!
//! Provides themes, the header and share-bar components, the trend, share,
//! bar and table views, and the main application event loop built on top of
//! [`ratatui`].

pub mod app;
pub mod bar_view;
pub mod components;
pub mod pie_view;
pub mod table_view;
pub mod themes;
pub mod trend_view;

pub use dashboard_core as core;
