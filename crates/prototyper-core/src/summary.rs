//! Aggregates shown in KPI cards and the sidebar.

use serde::Serialize;

use crate::feedback::{FeedbackEntry, FeedbackStatus};

/// Totals over a set of entries.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FeedbackSummary {
  pub total:          usize,
  pub open:           usize,
  pub resolved:       usize,
  /// `None` when there is nothing to average.
  pub average_rating: Option<f64>,
}

impl FeedbackSummary {
  pub fn from_entries(entries: &[FeedbackEntry]) -> Self {
    let total = entries.len();
    let open = entries
      .iter()
      .filter(|e| e.status == FeedbackStatus::Open)
      .count();
    let rating_sum: u64 = entries.iter().map(|e| u64::from(e.rating)).sum();
    let average_rating = (total > 0).then(|| rating_sum as f64 / total as f64);

    Self { total, open, resolved: total - open, average_rating }
  }

  /// `"3.7 ★"`, or `"–"` for an empty set.
  pub fn average_label(&self) -> String {
    match self.average_rating {
      Some(avg) => format!("{avg:.1} ★"),
      None => "–".to_owned(),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::DateTime;

  use super::*;
  use crate::feedback::FeedbackId;

  fn entry(rating: u8, status: FeedbackStatus) -> FeedbackEntry {
    FeedbackEntry {
      id: FeedbackId::new("x"),
      page_id: "p".into(),
      element_id: None,
      round: 1,
      author: "a".into(),
      comment: "c".into(),
      rating,
      status,
      created_at: DateTime::from_timestamp(0, 0).unwrap(),
      source: None,
    }
  }

  #[test]
  fn empty_summary_has_no_average() {
    let s = FeedbackSummary::from_entries(&[]);
    assert_eq!(s.total, 0);
    assert_eq!(s.average_rating, None);
    assert_eq!(s.average_label(), "–");
  }

  #[test]
  fn counts_and_average() {
    let s = FeedbackSummary::from_entries(&[
      entry(5, FeedbackStatus::Open),
      entry(2, FeedbackStatus::Resolved),
      entry(4, FeedbackStatus::Open),
    ]);
    assert_eq!((s.total, s.open, s.resolved), (3, 2, 1));
    assert_eq!(s.average_label(), "3.7 ★");
  }
}
