//! Domain types for the dashboard prototyper: feedback entries, the
//! [`store::FeedbackStore`] trait both backends implement, aggregates over
//! entries and the static mock [`dataset::Dataset`].
//!
//! No HTTP and no database code lives here.

pub mod clock;
pub mod dataset;
pub mod error;
pub mod feedback;
pub mod store;
pub mod summary;

pub use error::{Error, Result};
