//! [`SheetStore`], the shared-spreadsheet implementation of [`FeedbackStore`].

use std::{sync::Arc, time::Duration};

use tracing::{debug, info};
use uuid::Uuid;

use prototyper_core::{
  clock::{Clock, SystemClock},
  feedback::{
    FeedbackEntry, FeedbackId, FeedbackStatus, NewFeedback, check_rating, sort_for_export,
    sort_newest_first,
  },
  store::{FeedbackQuery, FeedbackStore},
};

use crate::{
  Error, Result,
  cache::RowCache,
  client::{SheetClient, WriteOutcome},
  encode::{AppendRow, RawRow, SOURCE, WriteRequest, encode_dt},
};

/// Reply text the endpoint uses when a status update names no row.
const ID_NOT_FOUND: &str = "ID not found";

/// Connection settings for the sheet endpoint.
#[derive(Debug, Clone)]
pub struct SheetConfig {
  /// URL of the published web app.
  pub endpoint:  String,
  /// How long a fetched snapshot serves reads. Writes always drop it.
  pub cache_ttl: Duration,
  /// Per-request HTTP timeout.
  pub timeout:   Duration,
}

impl SheetConfig {
  pub fn new(endpoint: impl Into<String>) -> Self {
    Self {
      endpoint:  endpoint.into(),
      cache_ttl: Duration::from_secs(10),
      timeout:   Duration::from_secs(30),
    }
  }
}

/// A feedback store kept in a shared spreadsheet.
///
/// There is no locking across processes: concurrent writers interleave and
/// the last status update wins.
#[derive(Clone)]
pub struct SheetStore {
  client: SheetClient,
  cache:  Arc<RowCache>,
  clock:  Arc<dyn Clock>,
}

impl SheetStore {
  pub fn new(config: SheetConfig) -> Result<Self> {
    Ok(Self {
      client: SheetClient::new(config.endpoint, config.timeout)?,
      cache:  Arc::new(RowCache::new(config.cache_ttl)),
      clock:  Arc::new(SystemClock),
    })
  }

  /// Replace the time source used for `created_at`.
  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  async fn fetch(&self) -> Result<Arc<Vec<FeedbackEntry>>> {
    let generation = self.cache.generation().await;
    let rows = self
      .client
      .fetch_rows()
      .await?
      .into_iter()
      .filter_map(RawRow::into_entry)
      .collect();
    Ok(self.cache.put(generation, rows).await)
  }

  /// Every row, from the cache when it is still fresh.
  async fn load_all(&self) -> Result<Arc<Vec<FeedbackEntry>>> {
    if let Some(rows) = self.cache.get().await {
      debug!("sheet cache hit");
      return Ok(rows);
    }
    debug!("sheet cache miss");
    self.fetch().await
  }

  /// Send a write, then drop the snapshot whatever the outcome.
  async fn write(&self, request: &WriteRequest<'_>) -> Result<WriteOutcome> {
    let outcome = self.client.write(request).await;
    self.cache.invalidate().await;
    outcome
  }
}

impl FeedbackStore for SheetStore {
  type Error = Error;

  async fn initialize(&self) -> Result<()> {
    let rows = self.fetch().await?;
    info!(rows = rows.len(), "sheet endpoint reachable");
    Ok(())
  }

  async fn add(&self, input: NewFeedback) -> Result<FeedbackId> {
    check_rating(input.rating)?;

    let id = Uuid::new_v4().to_string();
    let row = AppendRow {
      id:         &id,
      page_id:    &input.page_id,
      element_id: input.element_id.as_deref().unwrap_or_default(),
      round:      input.round,
      author:     &input.author,
      comment:    &input.comment,
      rating:     input.rating,
      status:     FeedbackStatus::Open,
      created_at: encode_dt(self.clock.now()),
      source:     SOURCE,
    };

    match self.write(&WriteRequest::AddFeedback(row)).await? {
      WriteOutcome::Done => {
        debug!(%id, "feedback appended to sheet");
        Ok(FeedbackId::new(id))
      }
      WriteOutcome::Refused(message) => Err(Error::Remote(message)),
    }
  }

  async fn query(&self, query: &FeedbackQuery) -> Result<Vec<FeedbackEntry>> {
    let rows = self.load_all().await?;
    let mut matched: Vec<_> = rows.iter().filter(|e| query.matches(e)).cloned().collect();
    sort_newest_first(&mut matched);
    Ok(matched)
  }

  async fn count_for_element(&self, page_id: &str, element_id: &str) -> Result<usize> {
    let rows = self.load_all().await?;
    Ok(
      rows
        .iter()
        .filter(|e| e.page_id == page_id && e.element_id.as_deref() == Some(element_id))
        .count(),
    )
  }

  async fn set_status(&self, id: &FeedbackId, status: FeedbackStatus) -> Result<()> {
    let request = WriteRequest::UpdateStatus { id: id.as_str(), status };
    match self.write(&request).await? {
      WriteOutcome::Done => {
        debug!(%id, %status, "sheet status updated");
        Ok(())
      }
      WriteOutcome::Refused(message) if message == ID_NOT_FOUND => {
        debug!(%id, "status update for unknown id ignored");
        Ok(())
      }
      WriteOutcome::Refused(message) => Err(Error::Remote(message)),
    }
  }

  async fn max_round(&self) -> Result<u32> {
    let rows = self.load_all().await?;
    Ok(rows.iter().map(|e| e.round).max().unwrap_or(1))
  }

  async fn export_all(&self) -> Result<Vec<FeedbackEntry>> {
    let mut rows = self.load_all().await?.as_ref().clone();
    sort_for_export(&mut rows);
    Ok(rows)
  }
}
