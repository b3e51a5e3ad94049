//! CSV and XLSX downloads of the overview's current selection.

use axum::{
  extract::{Query, State},
  http::header,
  response::{IntoResponse, Response},
};
use chrono::SecondsFormat;
use prototyper_core::{feedback::FeedbackEntry, store::FeedbackStore};
use prototyper_store_sheet::COLUMNS;
use rust_xlsxwriter::{Format, Workbook};

use crate::{
  AppState, Error, Result,
  pages::feedback_overview::{OverviewFilter, OverviewParams},
};

const CSV_TYPE: &str = "text/csv; charset=utf-8";
const XLSX_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// One export row, cells in [`COLUMNS`] order.
fn cells(e: &FeedbackEntry) -> [String; 10] {
  [
    e.id.to_string(),
    e.page_id.clone(),
    e.element_id.clone().unwrap_or_default(),
    e.round.to_string(),
    e.author.clone(),
    e.comment.clone(),
    e.rating.to_string(),
    e.status.to_string(),
    e.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
    e.source.clone().unwrap_or_default(),
  ]
}

// ─── CSV ─────────────────────────────────────────────────────────────────────

fn csv_field(out: &mut String, field: &str) {
  if field.contains([',', '"', '\r', '\n']) {
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
  } else {
    out.push_str(field);
  }
}

fn csv_record<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
  for (i, field) in fields.into_iter().enumerate() {
    if i > 0 {
      out.push(',');
    }
    csv_field(out, field);
  }
  out.push_str("\r\n");
}

/// RFC 4180 text with a header row.
pub fn to_csv(entries: &[FeedbackEntry]) -> String {
  let mut out = String::new();
  csv_record(&mut out, COLUMNS);
  for e in entries {
    let row = cells(e);
    csv_record(&mut out, row.iter().map(String::as_str));
  }
  out
}

// ─── XLSX ────────────────────────────────────────────────────────────────────

/// A single `feedback` sheet with a bold header; round and rating are
/// written as numbers.
pub fn to_xlsx(entries: &[FeedbackEntry]) -> Result<Vec<u8>> {
  let mut workbook = Workbook::new();
  let sheet = workbook.add_worksheet();
  sheet.set_name("feedback")?;

  let bold = Format::new().set_bold();
  for (col, name) in COLUMNS.iter().enumerate() {
    sheet.write_string_with_format(0, col as u16, *name, &bold)?;
  }

  for (i, e) in entries.iter().enumerate() {
    let row = i as u32 + 1;
    for (col, value) in cells(e).iter().enumerate() {
      let col = col as u16;
      match COLUMNS[usize::from(col)] {
        "round" => sheet.write_number(row, col, f64::from(e.round))?,
        "rating" => sheet.write_number(row, col, f64::from(e.rating))?,
        _ => sheet.write_string(row, col, value)?,
      };
    }
  }
  sheet.autofit();

  Ok(workbook.save_to_buffer()?)
}

// ─── Handlers ────────────────────────────────────────────────────────────────

async fn selection<S: FeedbackStore>(store: &S, params: &OverviewParams) -> Result<Vec<FeedbackEntry>> {
  let all = store.export_all().await.map_err(Error::store)?;
  Ok(OverviewFilter::from_params(params).apply(all))
}

fn attachment(content_type: &'static str, filename: &str, body: impl IntoResponse) -> Response {
  (
    [
      (header::CONTENT_TYPE, content_type.to_owned()),
      (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
    ],
    body,
  )
    .into_response()
}

/// `GET /feedback/export.csv`
pub async fn csv<S>(State(state): State<AppState<S>>, Query(params): Query<OverviewParams>) -> Result<Response>
where
  S: FeedbackStore,
{
  let entries = selection(state.store.as_ref(), &params).await?;
  tracing::debug!(rows = entries.len(), "csv export");
  Ok(attachment(CSV_TYPE, "feedback.csv", to_csv(&entries)))
}

/// `GET /feedback/export.xlsx`
pub async fn xlsx<S>(State(state): State<AppState<S>>, Query(params): Query<OverviewParams>) -> Result<Response>
where
  S: FeedbackStore,
{
  let entries = selection(state.store.as_ref(), &params).await?;
  tracing::debug!(rows = entries.len(), "xlsx export");
  Ok(attachment(XLSX_TYPE, "feedback.xlsx", to_xlsx(&entries)?))
}

#[cfg(test)]
mod tests {
  use chrono::DateTime;
  use prototyper_core::feedback::{FeedbackId, FeedbackStatus};

  use super::*;

  fn entry(comment: &str, element: Option<&str>) -> FeedbackEntry {
    FeedbackEntry {
      id:         FeedbackId::new("1"),
      page_id:    "exec-summary".into(),
      element_id: element.map(str::to_owned),
      round:      1,
      author:     "Max".into(),
      comment:    comment.into(),
      rating:     4,
      status:     FeedbackStatus::Open,
      created_at: DateTime::from_timestamp(1_750_000_000, 0).unwrap(),
      source:     Some("sqlite".into()),
    }
  }

  #[test]
  fn csv_has_header_and_crlf_rows() {
    let csv = to_csv(&[entry("passt", Some("trx-chart"))]);
    let mut lines = csv.split("\r\n");
    assert_eq!(
      lines.next(),
      Some("id,page_id,element_id,round,author,comment,rating,status,created_at,source")
    );
    assert_eq!(
      lines.next(),
      Some("1,exec-summary,trx-chart,1,Max,passt,4,open,2025-06-15T15:06:40Z,sqlite")
    );
    assert_eq!(lines.next(), Some(""));
  }

  #[test]
  fn csv_quotes_special_fields() {
    let csv = to_csv(&[entry("Achse \"Plan\", bitte\nprüfen", None)]);
    assert!(csv.contains(",\"Achse \"\"Plan\"\", bitte\nprüfen\","));
    assert!(csv.contains("exec-summary,,1"));
  }

  #[test]
  fn empty_selection_is_header_only() {
    assert_eq!(to_csv(&[]).matches("\r\n").count(), 1);
  }

  #[test]
  fn xlsx_is_a_zip_container() {
    let bytes = to_xlsx(&[entry("passt", None)]).unwrap();
    assert!(bytes.starts_with(b"PK"));
  }
}
