//! Embedded-database backend for the feedback store.
//!
//! One `feedback` table; every call hops onto the [`tokio_rusqlite`]
//! connection thread.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
