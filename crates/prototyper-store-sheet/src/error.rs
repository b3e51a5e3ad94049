//! Error type for `prototyper-store-sheet`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] prototyper_core::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("sheet endpoint answered {0}")]
  HttpStatus(reqwest::StatusCode),

  /// The endpoint answered `{"status": "error"}`.
  #[error("sheet error: {0}")]
  Remote(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
