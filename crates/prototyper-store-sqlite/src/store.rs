//! [`SqliteStore`], the SQLite implementation of [`FeedbackStore`].

use std::{path::Path, sync::Arc};

use rusqlite::types::Value;
use tracing::debug;

use prototyper_core::{
  clock::{Clock, SystemClock},
  feedback::{FeedbackEntry, FeedbackId, FeedbackStatus, NewFeedback, check_rating},
  store::{ElementFilter, FeedbackQuery, FeedbackStore},
};

use crate::{
  Result,
  encode::{COLUMNS, RawEntry, SOURCE, decode_id, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A feedback store backed by a single SQLite file.
///
/// The inner connection is reference-counted. Writes are
/// serialised by the single connection and SQLite's own file lock.
#[derive(Clone)]
pub struct SqliteStore {
  conn:  tokio_rusqlite::Connection,
  clock: Arc<dyn Clock>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, clock: Arc::new(SystemClock) };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, clock: Arc::new(SystemClock) };
    store.init_schema().await?;
    Ok(store)
  }

  /// Replace the time source used for `created_at`.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `SELECT <columns> FROM feedback <tail>` and decode every row.
  async fn select(&self, tail: String, params: Vec<Value>) -> Result<Vec<FeedbackEntry>> {
    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {COLUMNS} FROM feedback {tail}");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }
}

/// Translate a [`FeedbackQuery`] into a `WHERE` clause plus positional
/// parameters.
fn where_clause(query: &FeedbackQuery) -> (String, Vec<Value>) {
  let mut conds: Vec<&'static str> = vec![];
  let mut params: Vec<Value> = vec![];

  if let Some(page_id) = &query.page_id {
    conds.push("page_id = ?");
    params.push(Value::Text(page_id.clone()));
  }
  if let Some(round) = query.round {
    conds.push("round = ?");
    params.push(Value::Integer(i64::from(round)));
  }
  if let Some(status) = query.status {
    conds.push("status = ?");
    params.push(Value::Text(status.as_str().to_owned()));
  }
  match &query.element {
    ElementFilter::Any => {}
    ElementFilter::PageLevel => conds.push("element_id IS NULL"),
    ElementFilter::Element(element_id) => {
      conds.push("element_id = ?");
      params.push(Value::Text(element_id.clone()));
    }
  }

  let clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  (clause, params)
}

// ─── FeedbackStore impl ──────────────────────────────────────────────────────

impl FeedbackStore for SqliteStore {
  type Error = crate::Error;

  async fn initialize(&self) -> Result<()> { self.init_schema().await }

  async fn add(&self, input: NewFeedback) -> Result<FeedbackId> {
    check_rating(input.rating)?;

    let created_at = encode_dt(self.clock.now());
    let NewFeedback { page_id, element_id, round, author, comment, rating } = input;

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO feedback (
             page_id, element_id, round, author, comment, rating,
             status, created_at, source
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'open', ?7, ?8)",
          rusqlite::params![
            page_id, element_id, round, author, comment, rating, created_at, SOURCE,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    debug!(id, "feedback recorded");
    Ok(FeedbackId::from(id))
  }

  async fn query(&self, query: &FeedbackQuery) -> Result<Vec<FeedbackEntry>> {
    let (clause, params) = where_clause(query);
    self
      .select(format!("{clause} ORDER BY created_at DESC, id DESC"), params)
      .await
  }

  async fn count_for_element(&self, page_id: &str, element_id: &str) -> Result<usize> {
    let page_id = page_id.to_owned();
    let element_id = element_id.to_owned();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM feedback WHERE page_id = ?1 AND element_id = ?2",
          rusqlite::params![page_id, element_id],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(usize::try_from(count).unwrap_or_default())
  }

  async fn set_status(&self, id: &FeedbackId, status: FeedbackStatus) -> Result<()> {
    let Some(key) = decode_id(id) else {
      debug!(%id, "status update for foreign id ignored");
      return Ok(());
    };

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE feedback SET status = ?1 WHERE id = ?2",
          rusqlite::params![status.as_str(), key],
        )?)
      })
      .await?;

    if changed == 0 {
      debug!(%id, "status update for unknown id ignored");
    } else {
      debug!(%id, %status, "feedback status updated");
    }
    Ok(())
  }

  async fn max_round(&self) -> Result<u32> {
    let max: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COALESCE(MAX(round), 1) FROM feedback", [], |row| {
          row.get(0)
        })?)
      })
      .await?;

    Ok(u32::try_from(max.max(1)).unwrap_or(u32::MAX))
  }

  async fn export_all(&self) -> Result<Vec<FeedbackEntry>> {
    self
      .select(
        "ORDER BY round ASC, page_id ASC, created_at ASC, id ASC".to_owned(),
        vec![],
      )
      .await
  }
}

#[cfg(test)]
mod where_tests {
  use super::*;

  #[test]
  fn empty_query_has_no_where() {
    let (clause, params) = where_clause(&FeedbackQuery::all());
    assert!(clause.is_empty());
    assert!(params.is_empty());
  }

  #[test]
  fn page_level_adds_no_parameter() {
    let (clause, params) = where_clause(&FeedbackQuery::page("p").round(2).page_level());
    assert_eq!(clause, "WHERE page_id = ? AND round = ? AND element_id IS NULL");
    assert_eq!(params.len(), 2);
  }
}
