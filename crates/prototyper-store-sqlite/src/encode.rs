//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that text ordering matches chronological ordering.

use chrono::{DateTime, SecondsFormat, Utc};
use prototyper_core::feedback::{FeedbackEntry, FeedbackId, FeedbackStatus};

use crate::{Error, Result};

/// Name written to the `source` column.
pub const SOURCE: &str = "sqlite";

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── FeedbackId ──────────────────────────────────────────────────────────────

/// Ids from this store are integers; anything else cannot exist here.
pub fn decode_id(id: &FeedbackId) -> Option<i64> { id.as_str().parse().ok() }

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `feedback` row.
pub struct RawEntry {
  pub id:         i64,
  pub page_id:    String,
  pub element_id: Option<String>,
  pub round:      i64,
  pub author:     String,
  pub comment:    String,
  pub rating:     i64,
  pub status:     String,
  pub created_at: String,
  pub source:     Option<String>,
}

/// Column list matching [`RawEntry::from_row`].
pub const COLUMNS: &str =
  "id, page_id, element_id, round, author, comment, rating, status, created_at, source";

impl RawEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      page_id:    row.get(1)?,
      element_id: row.get(2)?,
      round:      row.get(3)?,
      author:     row.get(4)?,
      comment:    row.get(5)?,
      rating:     row.get(6)?,
      status:     row.get(7)?,
      created_at: row.get(8)?,
      source:     row.get(9)?,
    })
  }

  pub fn into_entry(self) -> Result<FeedbackEntry> {
    let id = self.id;
    let corrupt = |reason: String| Error::CorruptRow { id, reason };

    let round = u32::try_from(self.round)
      .map_err(|_| corrupt(format!("round {}", self.round)))?;
    let rating = u8::try_from(self.rating)
      .map_err(|_| corrupt(format!("rating {}", self.rating)))?;
    let status: FeedbackStatus = self.status.parse()?;
    let created_at = decode_dt(&self.created_at)?;

    Ok(FeedbackEntry {
      id: FeedbackId::from(id),
      page_id: self.page_id,
      element_id: self.element_id,
      round,
      author: self.author,
      comment: self.comment,
      rating,
      status,
      created_at,
      source: self.source,
    })
  }
}
