//! Error type for `prototyper-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] prototyper_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value the schema should have rejected.
  #[error("corrupt row {id}: {reason}")]
  CorruptRow { id: i64, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
