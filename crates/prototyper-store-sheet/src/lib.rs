//! Shared-spreadsheet backend for the feedback store.
//!
//! Talks to a web-app endpoint published from the spreadsheet (one tab named
//! `feedback`, header row in [`COLUMNS`] order). `GET` returns every row,
//! `POST` appends a row or updates a status cell. All filtering happens
//! client-side over a cached snapshot that is dropped on every write.

mod cache;
mod client;
mod encode;
mod store;

pub mod error;

pub use encode::COLUMNS;
pub use error::{Error, Result};
pub use store::{SheetConfig, SheetStore};
