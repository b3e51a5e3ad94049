//! The `FeedbackStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (`prototyper-store-sqlite`,
//! `prototyper-store-sheet`). The API and web layers depend on this
//! abstraction, never on a concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::feedback::{FeedbackEntry, FeedbackId, FeedbackStatus, NewFeedback};

// ─── Query type ──────────────────────────────────────────────────────────────

/// How [`FeedbackQuery`] treats `element_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ElementFilter {
  /// No restriction.
  #[default]
  Any,
  /// Only comments about the page as a whole.
  PageLevel,
  /// Only comments about this element.
  Element(String),
}

impl ElementFilter {
  pub fn matches(&self, element_id: Option<&str>) -> bool {
    match self {
      Self::Any => true,
      Self::PageLevel => element_id.is_none(),
      Self::Element(want) => element_id == Some(want.as_str()),
    }
  }
}

/// Parameters for [`FeedbackStore::query`]. Omitted filters match
/// everything; supplied filters are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackQuery {
  pub page_id: Option<String>,
  pub round:   Option<u32>,
  pub status:  Option<FeedbackStatus>,
  pub element: ElementFilter,
}

impl FeedbackQuery {
  /// Everything in the store.
  pub fn all() -> Self { Self::default() }

  pub fn page(page_id: impl Into<String>) -> Self {
    Self { page_id: Some(page_id.into()), ..Self::default() }
  }

  pub fn round(mut self, round: u32) -> Self {
    self.round = Some(round);
    self
  }

  pub fn status(mut self, status: FeedbackStatus) -> Self {
    self.status = Some(status);
    self
  }

  pub fn page_level(mut self) -> Self {
    self.element = ElementFilter::PageLevel;
    self
  }

  pub fn element(mut self, element_id: impl Into<String>) -> Self {
    self.element = ElementFilter::Element(element_id.into());
    self
  }

  /// In-memory evaluation, for backends that filter client-side.
  pub fn matches(&self, entry: &FeedbackEntry) -> bool {
    self.page_id.as_deref().is_none_or(|p| entry.page_id == p)
      && self.round.is_none_or(|r| entry.round == r)
      && self.status.is_none_or(|s| entry.status == s)
      && self.element.matches(entry.element_id.as_deref())
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a feedback store backend.
///
/// Entries are append-only apart from their status; nothing is ever deleted.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait FeedbackStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Prepare the backing medium. Safe to call more than once.
  fn initialize(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Persist a new entry with status `open` and return its id.
  ///
  /// Only the rating is re-checked here; string content is the caller's
  /// responsibility (see [`NewFeedback::validate`]). The entry is visible to
  /// every later read from this process once the future resolves.
  fn add(
    &self,
    input: NewFeedback,
  ) -> impl Future<Output = Result<FeedbackId, Self::Error>> + Send + '_;

  /// Entries matching `query`, newest first. Never fails for "no match".
  fn query<'a>(
    &'a self,
    query: &'a FeedbackQuery,
  ) -> impl Future<Output = Result<Vec<FeedbackEntry>, Self::Error>> + Send + 'a;

  /// Number of entries attached to `element_id` on `page_id`.
  fn count_for_element<'a>(
    &'a self,
    page_id: &'a str,
    element_id: &'a str,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Overwrite the status of one entry. Unknown ids are ignored: the caller
  /// may be acting on a stale page.
  fn set_status<'a>(
    &'a self,
    id: &'a FeedbackId,
    status: FeedbackStatus,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Highest round seen so far, or 1 for an empty store.
  fn max_round(&self) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  /// Every entry, ordered by round, page and creation time.
  fn export_all(
    &self,
  ) -> impl Future<Output = Result<Vec<FeedbackEntry>, Self::Error>> + Send + '_;
}
