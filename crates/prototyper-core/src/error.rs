//! Error types for `prototyper-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("rating must be between 1 and 5, got {0}")]
  InvalidRating(u8),

  #[error("round must be between 1 and {}", crate::feedback::MAX_ROUND)]
  InvalidRound,

  #[error("round {round} is ahead of the next open round {next}")]
  RoundAhead { round: u32, next: u32 },

  #[error("{0} must not be empty")]
  EmptyField(&'static str),

  #[error("unknown feedback status: {0:?}")]
  UnknownStatus(String),

  #[error("dataset error: {0}")]
  Dataset(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

impl Error {
  /// Whether this error came from input validation rather than I/O.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::InvalidRating(_)
        | Self::InvalidRound
        | Self::RoundAhead { .. }
        | Self::EmptyField(_)
        | Self::UnknownStatus(_)
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
