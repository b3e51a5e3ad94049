//! Admin overview of every comment: totals, filters, export and status
//! toggles.
//!
//! The filter form submits with GET so the current selection lives in the
//! URL; the export buttons resubmit the same fields to the export routes.

use std::collections::BTreeSet;

use axum::{
  extract::{Query, RawQuery, State},
  response::Html,
};
use prototyper_core::{
  feedback::{FeedbackEntry, FeedbackStatus},
  store::{ElementFilter, FeedbackQuery, FeedbackStore},
  summary::FeedbackSummary,
};
use serde::Deserialize;

use super::{Page, PageContext, PageParams};
use crate::{
  AppState, Result,
  forms::strip_notice,
  html::{Kpi, attr, esc, feedback_item, kpi_row},
  theme::{GREEN, RED, YELLOW},
};

const PAGE: Page = Page::Feedback;

/// `f_element` value selecting page-level comments only.
pub const PAGE_LEVEL: &str = "__page";

#[derive(Debug, Default, Deserialize)]
pub struct OverviewParams {
  #[serde(flatten)]
  pub page:      PageParams,
  pub f_round:   Option<String>,
  pub f_page:    Option<String>,
  pub f_element: Option<String>,
  pub f_status:  Option<String>,
}

/// The parsed filter selection. Blank or unparsable fields mean "Alle".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverviewFilter {
  pub round:   Option<u32>,
  pub page_id: Option<String>,
  pub element: ElementFilter,
  pub status:  Option<FeedbackStatus>,
}

fn non_blank(raw: Option<&str>) -> Option<&str> { raw.map(str::trim).filter(|s| !s.is_empty()) }

impl OverviewFilter {
  pub fn from_params(params: &OverviewParams) -> Self {
    let element = match non_blank(params.f_element.as_deref()) {
      None => ElementFilter::Any,
      Some(PAGE_LEVEL) => ElementFilter::PageLevel,
      Some(id) => ElementFilter::Element(id.to_owned()),
    };
    Self {
      round: non_blank(params.f_round.as_deref()).and_then(|r| r.parse().ok()),
      page_id: non_blank(params.f_page.as_deref()).map(str::to_owned),
      element,
      status: non_blank(params.f_status.as_deref()).and_then(|s| s.parse().ok()),
    }
  }

  pub fn query(&self) -> FeedbackQuery {
    FeedbackQuery {
      page_id: self.page_id.clone(),
      round:   self.round,
      status:  self.status,
      element: self.element.clone(),
    }
  }

  /// `entries` narrowed to the selection, order preserved.
  pub fn apply(&self, entries: Vec<FeedbackEntry>) -> Vec<FeedbackEntry> {
    let query = self.query();
    entries.into_iter().filter(|e| query.matches(e)).collect()
  }
}

/// Where status toggles on the overview send the user back to: the same
/// filter selection, minus any stale notice.
pub fn return_to(raw_query: Option<&str>) -> String {
  match raw_query {
    Some(q) if !q.is_empty() => strip_notice(&format!("{}?{q}", PAGE.path())),
    _ => PAGE.path().to_owned(),
  }
}

pub fn kpis(summary: &FeedbackSummary) -> Vec<Kpi> {
  vec![
    Kpi::new("Gesamt", summary.total.to_string()),
    Kpi::new("Ø Bewertung", summary.average_label()).color(YELLOW),
    Kpi::new("Offen", summary.open.to_string()).color(if summary.open > 0 { RED } else { GREEN }),
    Kpi::new("Erledigt", summary.resolved.to_string()).color(GREEN),
  ]
}

// ─── Filter form ─────────────────────────────────────────────────────────────

fn select(label: &str, name: &str, selected: &str, options: &[(String, String)]) -> String {
  let mut out = format!(r#"<label>{}<select name="{name}"><option value="">Alle</option>"#, esc(label));
  for (value, text) in options {
    let sel = if value == selected { " selected" } else { "" };
    out.push_str(&format!(r#"<option value="{}"{sel}>{}</option>"#, attr(value), esc(text)));
  }
  out.push_str("</select></label>");
  out
}

fn filter_form(all: &[FeedbackEntry], params: &OverviewParams, round: u32) -> String {
  let rounds: BTreeSet<u32> = all.iter().map(|e| e.round).collect();
  let pages: BTreeSet<&str> = all.iter().map(|e| e.page_id.as_str()).collect();
  let elements: BTreeSet<&str> = all.iter().filter_map(|e| e.element_id.as_deref()).collect();

  let round_opts: Vec<_> = rounds
    .iter()
    .map(|r| (r.to_string(), format!("Runde {r}")))
    .collect();
  let page_opts: Vec<_> = pages.iter().map(|p| (p.to_string(), p.to_string())).collect();
  let mut element_opts = vec![(PAGE_LEVEL.to_owned(), "nur Seiten-Feedback".to_owned())];
  element_opts.extend(elements.iter().map(|e| (e.to_string(), e.to_string())));
  let status_opts = [
    (FeedbackStatus::Open.to_string(), "Offen".to_owned()),
    (FeedbackStatus::Resolved.to_string(), "Erledigt".to_owned()),
  ];

  let current = |v: &Option<String>| v.as_deref().unwrap_or_default().trim().to_owned();
  format!(
    r#"<section class="section-card"><div class="section-title">Filter &amp; Export</div>
<form class="filters" method="get" action="/feedback"><input type="hidden" name="round" value="{round}">{r}{p}{e}{s}
<button type="submit">Filtern</button>
<button type="submit" formaction="/feedback/export.csv">📥 CSV</button>
<button type="submit" formaction="/feedback/export.xlsx">📥 Excel</button></form></section>"#,
    r = select("Runde", "f_round", &current(&params.f_round), &round_opts),
    p = select("Seite", "f_page", &current(&params.f_page), &page_opts),
    e = select("Element", "f_element", &current(&params.f_element), &element_opts),
    s = select("Status", "f_status", &current(&params.f_status), &status_opts),
  )
}

/// `GET /feedback`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<OverviewParams>,
  RawQuery(raw): RawQuery,
) -> Result<Html<String>>
where
  S: FeedbackStore,
{
  let ctx = PageContext::load(state.store.as_ref(), PAGE, &params.page).await?;
  let all = &ctx.entries;

  if all.is_empty() {
    return Ok(ctx.render(
      r#"<section class="section-card empty-state"><div style="font-size:32px">📋</div><div>Noch kein Feedback vorhanden.</div><div class="sub">Gib auf den Dashboard-Seiten Feedback ab!</div></section>"#,
    ));
  }

  let back = return_to(raw.as_deref());
  let filtered = OverviewFilter::from_params(&params).apply(all.clone());

  let mut list = format!(r#"<div class="history-title">{} Einträge</div>"#, filtered.len());
  for entry in &filtered {
    list.push_str(&feedback_item(entry, &back, true));
  }

  let body = format!(
    "{kpis}{filters}{list}",
    kpis = kpi_row(&kpis(&FeedbackSummary::from_entries(all))),
    filters = filter_form(all, &params, ctx.round),
  );
  Ok(ctx.render(&body))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn params(round: &str, page: &str, element: &str, status: &str) -> OverviewParams {
    let opt = |s: &str| Some(s.to_owned());
    OverviewParams {
      page:      PageParams::default(),
      f_round:   opt(round),
      f_page:    opt(page),
      f_element: opt(element),
      f_status:  opt(status),
    }
  }

  #[test]
  fn blank_fields_select_everything() {
    let f = OverviewFilter::from_params(&params("", " ", "", ""));
    assert_eq!(f, OverviewFilter::default());
    assert_eq!(f.query(), FeedbackQuery::all());
  }

  #[test]
  fn fields_map_onto_the_store_query() {
    let f = OverviewFilter::from_params(&params("2", "exec-summary", "trx-chart", "resolved"));
    assert_eq!(
      f.query(),
      FeedbackQuery::page("exec-summary")
        .round(2)
        .status(FeedbackStatus::Resolved)
        .element("trx-chart")
    );
    let f = OverviewFilter::from_params(&params("zwei", "", PAGE_LEVEL, "kaputt"));
    assert_eq!(f.round, None);
    assert_eq!(f.status, None);
    assert_eq!(f.element, ElementFilter::PageLevel);
  }

  #[test]
  fn return_to_drops_notices() {
    assert_eq!(return_to(None), "/feedback");
    assert_eq!(return_to(Some("error=missing")), "/feedback");
    assert_eq!(
      return_to(Some("round=2&f_page=exec-summary&error=rating")),
      "/feedback?round=2&f_page=exec-summary"
    );
  }

  #[test]
  fn open_count_turns_red() {
    let mut s = FeedbackSummary { total: 2, open: 1, resolved: 1, average_rating: Some(4.0) };
    assert_eq!(kpis(&s)[2].color, Some(RED));
    assert_eq!(kpis(&s)[1].value, "4.0 ★");
    s.open = 0;
    assert_eq!(kpis(&s)[2].color, Some(GREEN));
  }
}
