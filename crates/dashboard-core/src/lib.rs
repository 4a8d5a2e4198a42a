//! Shared foundations for the sales dashboard.
//!
//! Holds the typed dataset model, the error type, date and number coercion,
//! display formatting and command-line settings used by every other crate.

pub mod dates;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
