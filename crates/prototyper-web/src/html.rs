//! HTML fragments shared by every page.
//!
//! Everything user-supplied goes through [`esc`] or [`attr`] before it is
//! interpolated.

use std::{borrow::Cow, collections::BTreeMap};

use prototyper_core::{
  feedback::{DEFAULT_RATING, FeedbackEntry, MAX_ROUND, RATING_RANGE},
  summary::FeedbackSummary,
};

use crate::{
  pages::Page,
  theme::{GREEN, STYLESHEET, TEXT_DIM, YELLOW},
};

pub fn esc(s: &str) -> Cow<'_, str> { html_escape::encode_text(s) }

pub fn attr(s: &str) -> Cow<'_, str> { html_escape::encode_double_quoted_attribute(s) }

// ─── Formatting ──────────────────────────────────────────────────────────────

/// `7900` → `"7.900"`.
pub fn thousands(n: u64) -> String {
  let digits = n.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push('.');
    }
    out.push(c);
  }
  out
}

/// `512000.4` → `"€512.000"`.
pub fn euro(v: f64) -> String {
  let sign = if v < 0.0 { "-" } else { "" };
  format!("{sign}€{}", thousands(v.abs().round() as u64))
}

/// Link to `path` that keeps the selected round.
pub fn round_href(path: &str, round: u32) -> String { format!("{path}?round={round}") }

/// Text for the `?error=` code a rejected form submission redirects with.
pub fn notice_text(code: &str) -> Option<&'static str> {
  match code {
    "missing" => Some("Bitte Name und Kommentar ausfüllen."),
    "rating" => Some("Die Bewertung muss zwischen 1 und 5 Sternen liegen."),
    "round" => Some("Ungültige Runde."),
    "invalid" => Some("Eingabe ungültig."),
    _ => None,
  }
}

// ─── Layout ──────────────────────────────────────────────────────────────────

/// What the sidebar shows: the round selector and status totals.
#[derive(Debug, Clone)]
pub struct Sidebar {
  pub current:      u32,
  /// Highest listed round, capped at [`MAX_ROUND`].
  pub max_round:    u32,
  /// Comment count per round that has comments.
  pub round_counts: BTreeMap<u32, usize>,
  pub summary:      FeedbackSummary,
}

impl Sidebar {
  pub fn new(current: u32, max_round: u32, entries: &[FeedbackEntry]) -> Self {
    let mut round_counts = BTreeMap::new();
    for e in entries {
      *round_counts.entry(e.round).or_insert(0) += 1;
    }
    Self {
      current,
      max_round: max_round.clamp(1, MAX_ROUND),
      round_counts,
      summary: FeedbackSummary::from_entries(entries),
    }
  }

  /// `(round, label)` for every selectable round, one past the highest.
  pub fn round_options(&self) -> Vec<(u32, String)> {
    let next = self.max_round.saturating_add(1);
    (1..=next)
      .map(|r| {
        let label = if r == next {
          format!("Runde {r} ← neu")
        } else {
          let n = self.round_counts.get(&r).copied().unwrap_or(0);
          format!("Runde {r} ({n} Kommentare)")
        };
        (r, label)
      })
      .collect()
  }

  fn render(&self, active: Page) -> String {
    let mut out = String::from(
      r#"<aside class="sidebar"><div class="brand">📋 Dashboard Prototyper<small>Rust-Variante</small></div>"#,
    );

    for (group, pages) in [("Dashboard", Page::DASHBOARD.as_slice()), ("Admin", Page::ADMIN.as_slice())] {
      out.push_str(&format!(r#"<div class="nav-group">{group}</div><nav class="nav">"#));
      for page in pages {
        let class = if *page == active { " class=\"active\"" } else { "" };
        out.push_str(&format!(
          r#"<a href="{}"{class}>{} {}</a>"#,
          attr(&round_href(page.path(), self.current)),
          page.icon(),
          page.title(),
        ));
      }
      out.push_str("</nav>");
    }

    out.push_str(r#"<div class="nav-group">🔄 Aktuelle Runde</div><div class="rounds">"#);
    for (round, label) in self.round_options() {
      let class = if round == self.current { " class=\"active\"" } else { "" };
      out.push_str(&format!(
        r#"<a href="{}"{class}>{}</a>"#,
        attr(&round_href(active.path(), round)),
        esc(&label),
      ));
    }
    out.push_str("</div>");

    let s = &self.summary;
    if s.total == 0 {
      out.push_str(r#"<div class="stats"><span class="empty">Noch kein Feedback abgegeben.</span></div>"#);
    } else {
      out.push_str(&format!(
        r#"<div class="stats"><b>📊 Status</b>
<div><span>Gesamt:</span><b>{}</b></div>
<div><span>🔲 Offen:</span><b style="color:{YELLOW}">{}</b></div>
<div><span>✅ Erledigt:</span><b style="color:{GREEN}">{}</b></div></div>"#,
        s.total, s.open, s.resolved,
      ));
    }
    out.push_str("</aside>");
    out
  }
}

/// A complete HTML document.
pub fn document(
  title: &str,
  active: Page,
  sidebar: &Sidebar,
  notice: Option<&str>,
  body: &str,
) -> String {
  let notice = notice
    .map(|n| format!(r#"<div class="notice">{}</div>"#, esc(n)))
    .unwrap_or_default();
  format!(
    r#"<!DOCTYPE html>
<html lang="de"><head><meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Dashboard Prototyper</title>
<style>{STYLESHEET}</style></head>
<body><div class="shell">{sidebar}<main class="main"><h2>{title}</h2>{notice}{body}</main></div></body></html>"#,
    title = esc(title),
    sidebar = sidebar.render(active),
  )
}

// ─── KPI cards ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Kpi {
  pub label: String,
  pub value: String,
  pub sub:   Option<String>,
  pub trend: Option<String>,
  /// Colours the trend, or the value when there is no trend.
  pub color: Option<&'static str>,
}

impl Kpi {
  pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
    Self { label: label.into(), value: value.into(), ..Self::default() }
  }

  pub fn sub(mut self, sub: impl Into<String>) -> Self {
    self.sub = Some(sub.into());
    self
  }

  pub fn trend(mut self, trend: impl Into<String>, color: &'static str) -> Self {
    self.trend = Some(trend.into());
    self.color = Some(color);
    self
  }

  pub fn color(mut self, color: &'static str) -> Self {
    self.color = Some(color);
    self
  }
}

pub fn kpi_row(kpis: &[Kpi]) -> String {
  let mut out = String::from(r#"<div class="kpis">"#);
  for k in kpis {
    let (value_style, trend) = match (&k.trend, k.color) {
      (Some(t), Some(c)) => (String::new(), format!(r#"<span class="trend" style="color:{c}">{}</span>"#, esc(t))),
      (None, Some(c)) => (format!(r#" style="color:{c}""#), String::new()),
      _ => (String::new(), String::new()),
    };
    let sub = k
      .sub
      .as_deref()
      .map(|s| format!(r#"<div class="sub">{}</div>"#, esc(s)))
      .unwrap_or_default();
    out.push_str(&format!(
      r#"<div class="kpi"><div class="label">{}</div><div class="value"{value_style}>{}{trend}</div>{sub}</div>"#,
      esc(&k.label),
      esc(&k.value),
    ));
  }
  out.push_str("</div>");
  out
}

// ─── Sections ────────────────────────────────────────────────────────────────

/// A titled card; `widget` is placed top right (usually an element bubble).
pub fn section(title: &str, sub: &str, widget: &str, content: &str) -> String {
  format!(
    r#"<section class="section-card"><div class="section-head"><div><div class="section-title">{}</div><div class="section-sub">{}</div></div>{widget}</div><div class="chart">{content}</div></section>"#,
    esc(title),
    esc(sub),
  )
}

// ─── Feedback ────────────────────────────────────────────────────────────────

/// Where a form sends the user afterwards.
#[derive(Debug, Clone, Copy)]
pub struct FormTarget<'a> {
  pub page_id:   &'a str,
  pub round:     u32,
  /// Path plus query of the page the form sits on.
  pub return_to: &'a str,
}

pub fn feedback_form(target: FormTarget<'_>, element_id: Option<&str>) -> String {
  let mut stars = String::new();
  for r in RATING_RANGE {
    let selected = if r == DEFAULT_RATING { " selected" } else { "" };
    stars.push_str(&format!(r#"<option value="{r}"{selected}>{}</option>"#, "★".repeat(r.into())));
  }
  format!(
    r#"<form class="feedback" method="post" action="/feedback">
<input type="hidden" name="page_id" value="{page}">
<input type="hidden" name="element_id" value="{element}">
<input type="hidden" name="round" value="{round}">
<input type="hidden" name="return_to" value="{ret}">
<input name="author" placeholder="Dein Name" required>
<textarea name="comment" placeholder="Was fällt dir auf? Was fehlt? Was sollte anders sein?" required></textarea>
<label>Bewertung <select name="rating">{stars}</select></label>
<button class="primary" type="submit">📩 Absenden</button></form>"#,
    page = attr(target.page_id),
    element = attr(element_id.unwrap_or_default()),
    round = target.round,
    ret = attr(target.return_to),
  )
}

/// One stored comment with its status toggle.
pub fn feedback_item(entry: &FeedbackEntry, return_to: &str, show_page: bool) -> String {
  let resolved = entry.status.is_resolved();
  let page_tag = if show_page {
    let target = match &entry.element_id {
      Some(el) => format!("{} › {}", entry.page_id, el),
      None => entry.page_id.clone(),
    };
    format!(r#"<span class="tag page">📄 {}</span>"#, esc(&target))
  } else {
    String::new()
  };
  let button = if resolved { "✅ Erledigt" } else { "🔲 Offen" };
  format!(
    r#"<div class="feedback-item{class}"><div style="flex:1">
<div><span class="feedback-round">Runde {round}</span> {page_tag} <span class="feedback-author">{author}</span> <span class="feedback-stars">{stars}</span></div>
<div class="feedback-comment">{comment}</div>
<div class="feedback-time">{time}</div></div>
<form method="post" action="/feedback/{id}/status"><input type="hidden" name="status" value="{next}"><input type="hidden" name="return_to" value="{ret}"><button type="submit">{button}</button></form></div>"#,
    class = if resolved { " resolved" } else { "" },
    round = entry.round,
    author = esc(&entry.author),
    stars = entry.stars(),
    comment = esc(&entry.comment),
    time = entry.created_at.format("%Y-%m-%d %H:%M"),
    id = attr(entry.id.as_str()),
    next = entry.status.toggled(),
    ret = attr(return_to),
  )
}

fn history(entries: &[FeedbackEntry], return_to: &str, show_page: bool) -> String {
  if entries.is_empty() {
    return String::new();
  }
  let mut out = format!(r#"<div class="history-title">Bisheriges Feedback ({})</div>"#, entries.len());
  for e in entries {
    out.push_str(&feedback_item(e, return_to, show_page));
  }
  out
}

/// The form plus history block at the bottom of a dashboard page.
pub fn feedback_section(target: FormTarget<'_>, entries: &[FeedbackEntry]) -> String {
  format!(
    r#"<section class="section-card" id="feedback"><div class="section-title">💬 Feedback zu dieser Seite</div>{}{}</section>"#,
    feedback_form(target, None),
    history(entries, target.return_to, true),
  )
}

/// Comment badge for one chart that opens a small form and the element's
/// history.
pub fn element_widget(
  target: FormTarget<'_>,
  element_id: &str,
  count: usize,
  entries: &[FeedbackEntry],
) -> String {
  let plural = if count == 1 { "" } else { "e" };
  let (class, badge) = if count > 0 {
    (" has", format!("💬 {count}"))
  } else {
    ("", "💬".to_owned())
  };
  format!(
    r#"<details class="bubble{class}"><summary title="{count} Kommentar{plural}">{badge}</summary><div class="pop"><div style="font-weight:700;margin-bottom:10px">💬 Feedback: <span style="font-weight:400;color:{TEXT_DIM}">{el}</span></div>{form}{history}</div></details>"#,
    el = esc(element_id),
    form = feedback_form(target, Some(element_id)),
    history = history(entries, target.return_to, false),
  )
}

#[cfg(test)]
mod tests {
  use chrono::DateTime;
  use prototyper_core::feedback::{FeedbackId, FeedbackStatus};

  use super::*;

  fn entry(comment: &str) -> FeedbackEntry {
    FeedbackEntry {
      id:         FeedbackId::new("7"),
      page_id:    "exec-summary".into(),
      element_id: Some("trx-chart".into()),
      round:      2,
      author:     "Max".into(),
      comment:    comment.into(),
      rating:     4,
      status:     FeedbackStatus::Open,
      created_at: DateTime::from_timestamp(1_746_266_400, 0).unwrap(),
      source:     None,
    }
  }

  #[test]
  fn thousands_groups_with_dots() {
    assert_eq!(thousands(0), "0");
    assert_eq!(thousands(999), "999");
    assert_eq!(thousands(8500), "8.500");
    assert_eq!(thousands(1_234_567), "1.234.567");
    assert_eq!(euro(600_000.0), "€600.000");
  }

  #[test]
  fn sidebar_offers_next_round() {
    let mut a = entry("a");
    a.round = 1;
    let b = entry("b");
    let sidebar = Sidebar::new(1, 2, &[a, b.clone(), b]);
    let options = sidebar.round_options();
    assert_eq!(options.len(), 3);
    assert_eq!(options[0].1, "Runde 1 (1 Kommentare)");
    assert_eq!(options[1].1, "Runde 2 (2 Kommentare)");
    assert_eq!(options[2].1, "Runde 3 ← neu");
    assert_eq!(sidebar.summary.total, 3);
  }

  #[test]
  fn sidebar_stays_bounded_for_huge_rounds() {
    let mut far = entry("far");
    far.round = u32::MAX;
    let sidebar = Sidebar::new(1, u32::MAX, &[far, entry("b")]);
    let options = sidebar.round_options();
    assert_eq!(options.len(), MAX_ROUND as usize + 1);
    assert_eq!(options[1].1, "Runde 2 (1 Kommentare)");
    assert_eq!(options[2].1, "Runde 3 (0 Kommentare)");
    assert_eq!(options.last().unwrap().1, format!("Runde {} ← neu", MAX_ROUND + 1));
  }

  #[test]
  fn comments_are_escaped() {
    let html = feedback_item(&entry("<script>alert(1)</script>"), "/exec?round=2", true);
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(html.contains("action=\"/feedback/7/status\""));
    assert!(html.contains("value=\"resolved\""));
    assert!(html.contains("exec-summary › trx-chart"));
  }

  #[test]
  fn widget_shows_count_badge() {
    let target = FormTarget { page_id: "exec-summary", round: 2, return_to: "/exec?round=2" };
    let html = element_widget(target, "trx-chart", 1, &[entry("zu klein")]);
    assert!(html.contains("💬 1"));
    assert!(html.contains("1 Kommentar\""));
    assert!(html.contains("name=\"element_id\" value=\"trx-chart\""));

    let empty = element_widget(target, "trx-chart", 0, &[]);
    assert!(!empty.contains("Bisheriges Feedback"));
  }
}
