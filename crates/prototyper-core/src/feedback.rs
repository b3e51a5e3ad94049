//! Feedback entries, the only persisted entity of the prototyper.
//!
//! An entry is created once by a store and afterwards only its `status`
//! changes. Entries are never deleted.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Accepted star ratings.
pub const RATING_RANGE: RangeInclusive<u8> = 1..=5;

/// Rating preselected in feedback forms.
pub const DEFAULT_RATING: u8 = 3;

/// Highest round a comment can carry.
pub const MAX_ROUND: u32 = 999;

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Opaque entry identifier.
///
/// The SQLite backend hands out integer keys, the sheet backend UUIDs; both
/// travel as text so callers never need to know which store they talk to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackId(String);

impl FeedbackId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for FeedbackId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<i64> for FeedbackId {
  fn from(id: i64) -> Self { Self(id.to_string()) }
}

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
  #[default]
  Open,
  Resolved,
}

impl FeedbackStatus {
  /// The string stored in the `status` column / sheet cell.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Open => "open",
      Self::Resolved => "resolved",
    }
  }

  /// The status a toggle button switches to.
  pub fn toggled(self) -> Self {
    match self {
      Self::Open => Self::Resolved,
      Self::Resolved => Self::Open,
    }
  }

  pub fn is_resolved(self) -> bool { matches!(self, Self::Resolved) }
}

impl fmt::Display for FeedbackStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for FeedbackStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "open" => Ok(Self::Open),
      "resolved" => Ok(Self::Resolved),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A stored comment about a dashboard page or one element on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
  pub id:         FeedbackId,
  pub page_id:    String,
  /// `None` for page-level comments.
  pub element_id: Option<String>,
  pub round:      u32,
  pub author:     String,
  pub comment:    String,
  pub rating:     u8,
  pub status:     FeedbackStatus,
  /// Store-assigned; never changes after creation.
  pub created_at: DateTime<Utc>,
  /// Which writer produced the row.
  pub source:     Option<String>,
}

impl FeedbackEntry {
  pub fn is_page_level(&self) -> bool { self.element_id.is_none() }

  /// `★★★☆☆` for a rating of three.
  pub fn stars(&self) -> String {
    let filled = usize::from(self.rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
  }
}

/// Order newest first; equal timestamps fall back to the id, descending.
pub fn sort_newest_first(entries: &mut [FeedbackEntry]) {
  entries.sort_by(|a, b| {
    b.created_at
      .cmp(&a.created_at)
      .then_with(|| b.id.cmp(&a.id))
  });
}

/// Export order: round, then page, then creation time, all ascending.
pub fn sort_for_export(entries: &mut [FeedbackEntry]) {
  entries.sort_by(|a, b| {
    a.round
      .cmp(&b.round)
      .then_with(|| a.page_id.cmp(&b.page_id))
      .then_with(|| a.created_at.cmp(&b.created_at))
  });
}

// ─── NewFeedback ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::FeedbackStore::add`].
/// `id`, `status` and `created_at` are always set by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFeedback {
  pub page_id:    String,
  #[serde(default)]
  pub element_id: Option<String>,
  pub round:      u32,
  pub author:     String,
  pub comment:    String,
  pub rating:     u8,
}

impl NewFeedback {
  /// A page-level comment.
  pub fn new(
    page_id: impl Into<String>,
    round: u32,
    author: impl Into<String>,
    comment: impl Into<String>,
    rating: u8,
  ) -> Self {
    Self {
      page_id: page_id.into(),
      element_id: None,
      round,
      author: author.into(),
      comment: comment.into(),
      rating,
    }
  }

  /// Attach the comment to one element of the page.
  pub fn on_element(mut self, element_id: impl Into<String>) -> Self {
    self.element_id = Some(element_id.into());
    self
  }

  /// Check and normalise user input before it is handed to a store.
  ///
  /// Author and comment are trimmed; an empty element id collapses to a
  /// page-level comment.
  pub fn validate(mut self) -> Result<Self> {
    self.page_id = self.page_id.trim().to_owned();
    self.author = self.author.trim().to_owned();
    self.comment = self.comment.trim().to_owned();
    self.element_id = self
      .element_id
      .map(|e| e.trim().to_owned())
      .filter(|e| !e.is_empty());

    if self.page_id.is_empty() {
      return Err(Error::EmptyField("page_id"));
    }
    if self.author.is_empty() {
      return Err(Error::EmptyField("author"));
    }
    if self.comment.is_empty() {
      return Err(Error::EmptyField("comment"));
    }
    if self.round == 0 || self.round > MAX_ROUND {
      return Err(Error::InvalidRound);
    }
    check_rating(self.rating)?;
    Ok(self)
  }

  /// Comments may go to any round up to the one after the newest.
  pub fn check_round(&self, max_round: u32) -> Result<()> {
    let next = max_round.saturating_add(1);
    if self.round > next {
      Err(Error::RoundAhead { round: self.round, next })
    } else {
      Ok(())
    }
  }
}

/// The one check stores repeat on insert.
pub fn check_rating(rating: u8) -> Result<()> {
  if RATING_RANGE.contains(&rating) {
    Ok(())
  } else {
    Err(Error::InvalidRating(rating))
  }
}
