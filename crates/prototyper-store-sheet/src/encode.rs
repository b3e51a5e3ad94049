//! Conversion between sheet rows and [`FeedbackEntry`].
//!
//! Sheet cells are loosely typed: numbers may come back as strings, blanks as
//! empty strings, timestamps with or without an offset. Decoding repairs what
//! it can and logs what it had to guess.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use prototyper_core::feedback::{
  DEFAULT_RATING, FeedbackEntry, FeedbackId, FeedbackStatus, MAX_ROUND, RATING_RANGE,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Header row of the `feedback` tab, in column order.
pub const COLUMNS: [&str; 10] = [
  "id", "page_id", "element_id", "round", "author", "comment", "rating", "status", "created_at",
  "source",
];

/// Name written to the `source` column.
pub const SOURCE: &str = "server";

// ─── Incoming rows ───────────────────────────────────────────────────────────

/// One row as the endpoint serialises it; every cell optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawRow {
  pub id:         Value,
  pub page_id:    Value,
  pub element_id: Value,
  pub round:      Value,
  pub author:     Value,
  pub comment:    Value,
  pub rating:     Value,
  pub status:     Value,
  pub created_at: Value,
  pub source:     Value,
}

fn text(v: &Value) -> String {
  match v {
    Value::Null => String::new(),
    Value::String(s) => s.trim().to_owned(),
    other => other.to_string(),
  }
}

fn number(v: &Value) -> Option<f64> {
  match v {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse().ok(),
    _ => None,
  }
  .filter(|n| n.is_finite())
}

fn non_empty(s: String) -> Option<String> { (!s.is_empty()).then_some(s) }

/// Accepts RFC 3339 and offset-less ISO timestamps (read as UTC).
pub fn decode_dt(s: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .ok()
    .or_else(|| {
      NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
    })
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Millis, true) }

impl RawRow {
  /// `None` for rows without an id; the sheet may contain blank lines.
  pub fn into_entry(self) -> Option<FeedbackEntry> {
    let id = text(&self.id);
    if id.is_empty() {
      return None;
    }

    let round = match number(&self.round) {
      Some(r) if (1.0..=f64::from(MAX_ROUND)).contains(&r) => r as u32,
      _ => {
        warn!(%id, round = %self.round, "unreadable round, assuming 1");
        1
      }
    };

    let rating = match number(&self.rating) {
      Some(r) => (r.round().clamp(
        f64::from(*RATING_RANGE.start()),
        f64::from(*RATING_RANGE.end()),
      )) as u8,
      None => {
        warn!(%id, rating = %self.rating, "unreadable rating, assuming default");
        DEFAULT_RATING
      }
    };

    let status = text(&self.status).parse().unwrap_or_else(|_| {
      warn!(%id, status = %self.status, "unknown status, treating as open");
      FeedbackStatus::Open
    });

    let created_raw = text(&self.created_at);
    let created_at = decode_dt(&created_raw).unwrap_or_else(|| {
      warn!(%id, created_at = %created_raw, "unreadable timestamp");
      DateTime::UNIX_EPOCH
    });

    Some(FeedbackEntry {
      id: FeedbackId::new(id),
      page_id: text(&self.page_id),
      element_id: non_empty(text(&self.element_id)),
      round,
      author: text(&self.author),
      comment: text(&self.comment),
      rating,
      status,
      created_at,
      source: non_empty(text(&self.source)),
    })
  }
}

// ─── Outgoing requests ───────────────────────────────────────────────────────

/// Body of a `POST` to the endpoint.
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WriteRequest<'a> {
  AddFeedback(AppendRow<'a>),
  UpdateStatus { id: &'a str, status: FeedbackStatus },
}

/// A new row, serialised with the sheet's column names.
#[derive(Debug, Serialize)]
pub struct AppendRow<'a> {
  pub id:         &'a str,
  pub page_id:    &'a str,
  /// Blank cell for page-level comments.
  pub element_id: &'a str,
  pub round:      u32,
  pub author:     &'a str,
  pub comment:    &'a str,
  pub rating:     u8,
  pub status:     FeedbackStatus,
  pub created_at: String,
  pub source:     &'a str,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn raw(v: Value) -> RawRow { serde_json::from_value(v).unwrap() }

  #[test]
  fn decodes_well_formed_row() {
    let e = raw(json!({
      "id": "abc", "page_id": "exec-summary", "element_id": "", "round": 2,
      "author": "Max", "comment": "passt", "rating": 5, "status": "resolved",
      "created_at": "2025-05-03T10:00:00.000Z", "source": "react"
    }))
    .into_entry()
    .unwrap();

    assert_eq!(e.id.as_str(), "abc");
    assert_eq!(e.element_id, None);
    assert_eq!(e.round, 2);
    assert_eq!(e.rating, 5);
    assert_eq!(e.status, FeedbackStatus::Resolved);
    assert_eq!(e.created_at.timestamp(), 1_746_266_400);
    assert_eq!(e.source.as_deref(), Some("react"));
  }

  #[test]
  fn repairs_sloppy_cells() {
    let e = raw(json!({
      "id": 42, "page_id": "p", "element_id": "trx-chart", "round": "",
      "author": "A", "comment": "c", "rating": "9", "status": "weird",
      "created_at": "2025-05-03T10:00:00.123456"
    }))
    .into_entry()
    .unwrap();

    assert_eq!(e.id.as_str(), "42");
    assert_eq!(e.element_id.as_deref(), Some("trx-chart"));
    assert_eq!(e.round, 1);
    assert_eq!(e.rating, 5);
    assert_eq!(e.status, FeedbackStatus::Open);
    assert_eq!(e.created_at.timestamp(), 1_746_266_400);
    assert_eq!(e.source, None);
  }

  #[test]
  fn out_of_range_round_falls_back_to_first() {
    for round in [json!(2_000_000), json!("4294967296"), json!(-3)] {
      let e = raw(json!({"id": "x", "round": round})).into_entry().unwrap();
      assert_eq!(e.round, 1, "{round}");
    }
  }

  #[test]
  fn missing_rating_falls_back_to_default() {
    let e = raw(json!({"id": "x", "created_at": "2025-01-01T00:00:00Z"}))
      .into_entry()
      .unwrap();
    assert_eq!(e.rating, DEFAULT_RATING);
  }

  #[test]
  fn rows_without_id_are_skipped() {
    assert!(raw(json!({"id": "", "page_id": "p"})).into_entry().is_none());
  }

  #[test]
  fn write_requests_carry_action_tag() {
    let body = serde_json::to_value(WriteRequest::UpdateStatus {
      id:     "abc",
      status: FeedbackStatus::Resolved,
    })
    .unwrap();
    assert_eq!(body, json!({"action": "update_status", "id": "abc", "status": "resolved"}));
  }
}
