//! Page handlers. Every request re-derives the whole page from the static
//! dataset and fresh store reads.

pub mod exec_summary;
pub mod feedback_overview;
pub mod market_uptake;
pub mod regional_view;

use axum::response::Html;
use prototyper_core::{
  feedback::FeedbackEntry,
  store::{FeedbackQuery, FeedbackStore},
};
use serde::Deserialize;

use crate::{
  Result,
  error::Error,
  html::{self, FormTarget, Sidebar, notice_text, round_href},
};

// ─── Navigation ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
  ExecSummary,
  MarketUptake,
  RegionalView,
  Feedback,
}

impl Page {
  pub const DASHBOARD: [Page; 3] = [Page::ExecSummary, Page::MarketUptake, Page::RegionalView];
  pub const ADMIN: [Page; 1] = [Page::Feedback];

  pub fn path(self) -> &'static str {
    match self {
      Page::ExecSummary => "/exec",
      Page::MarketUptake => "/uptake",
      Page::RegionalView => "/regional",
      Page::Feedback => "/feedback",
    }
  }

  /// The `page_id` stored with comments made on this page.
  pub fn page_id(self) -> &'static str {
    match self {
      Page::ExecSummary => "exec-summary",
      Page::MarketUptake => "market-uptake",
      Page::RegionalView => "regional-view",
      Page::Feedback => "feedback-overview",
    }
  }

  pub fn title(self) -> &'static str {
    match self {
      Page::ExecSummary => "Executive Summary",
      Page::MarketUptake => "Markt-Uptake & Verordner",
      Page::RegionalView => "Regionale Performance",
      Page::Feedback => "Feedback-Übersicht",
    }
  }

  pub fn icon(self) -> &'static str {
    match self {
      Page::ExecSummary => "📊",
      Page::MarketUptake => "📈",
      Page::RegionalView => "🗺",
      Page::Feedback => "💬",
    }
  }
}

// ─── Per-request context ─────────────────────────────────────────────────────

/// Query parameters every page understands.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  /// Selected feedback round; anything unparsable means round 1.
  pub round: Option<String>,
  /// Code of a rejected form submission.
  pub error: Option<String>,
}

pub(crate) fn parse_round(raw: Option<&str>) -> u32 {
  raw
    .and_then(|r| r.trim().parse::<u32>().ok())
    .filter(|r| *r >= 1)
    .unwrap_or(1)
}

/// Everything the page chrome needs, read once per request.
pub(crate) struct PageContext {
  pub page:      Page,
  pub round:     u32,
  pub sidebar:   Sidebar,
  pub return_to: String,
  pub notice:    Option<&'static str>,
  /// Every stored entry, in export order.
  pub entries:   Vec<FeedbackEntry>,
}

impl PageContext {
  pub async fn load<S: FeedbackStore>(store: &S, page: Page, params: &PageParams) -> Result<Self> {
    let round = parse_round(params.round.as_deref());
    let max_round = store.max_round().await.map_err(Error::store)?;
    let entries = store.export_all().await.map_err(Error::store)?;
    Ok(Self {
      page,
      round,
      sidebar: Sidebar::new(round, max_round, &entries),
      return_to: round_href(page.path(), round),
      notice: params.error.as_deref().and_then(notice_text),
      entries,
    })
  }

  pub fn target(&self) -> FormTarget<'_> {
    FormTarget {
      page_id:   self.page.page_id(),
      round:     self.round,
      return_to: &self.return_to,
    }
  }

  pub fn render(&self, body: &str) -> Html<String> {
    Html(html::document(self.page.title(), self.page, &self.sidebar, self.notice, body))
  }

  /// Comment badge, form and history for one chart of this page.
  pub async fn element_widget<S: FeedbackStore>(&self, store: &S, element_id: &str) -> Result<String> {
    let page_id = self.page.page_id();
    let count = store
      .count_for_element(page_id, element_id)
      .await
      .map_err(Error::store)?;
    let query = FeedbackQuery::page(page_id).element(element_id);
    let entries = store.query(&query).await.map_err(Error::store)?;
    Ok(html::element_widget(self.target(), element_id, count, &entries))
  }

  /// Form plus every comment on this page, newest first.
  pub async fn feedback_section<S: FeedbackStore>(&self, store: &S) -> Result<String> {
    let query = FeedbackQuery::page(self.page.page_id());
    let entries = store.query(&query).await.map_err(Error::store)?;
    Ok(html::feedback_section(self.target(), &entries))
  }
}
