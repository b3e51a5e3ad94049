//! The static mock business data every page renders from.
//!
//! Loaded once at startup from a JSON document with the keys `monthly`,
//! `regions`, `competitors` and `kpis`; never written back.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// One month of prescription and revenue figures, actual vs. plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
  /// `YYYY-MM`.
  pub month:       String,
  pub trx:         u64,
  pub trx_plan:    u64,
  pub nrx:         u64,
  pub rrx:         u64,
  pub net_revenue: f64,
  pub net_plan:    f64,
  pub prescribers: u64,
}

/// Cumulative figures for one KV region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
  pub region:       String,
  pub trx:          u64,
  pub trx_plan:     u64,
  pub net_revenue:  f64,
  /// Percent.
  pub market_share: f64,
}

impl RegionRecord {
  /// Actual over plan in percent; 0 when there is no plan.
  pub fn achievement_pct(&self) -> f64 {
    if self.trx_plan == 0 {
      0.0
    } else {
      self.trx as f64 / self.trx_plan as f64 * 100.0
    }
  }
}

/// Market shares in percent for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorShare {
  pub month:     String,
  pub cardiozan: f64,
  pub forxiga:   f64,
  pub jardiance: f64,
  pub invokana:  f64,
}

/// Headline numbers for the executive summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
  pub cumulative_net_revenue: f64,
  pub cumulative_trx:         u64,
  pub active_prescribers:     u64,
  /// Percent.
  pub market_share_latest:    f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
  pub monthly:     Vec<MonthlyRecord>,
  pub regions:     Vec<RegionRecord>,
  pub competitors: Vec<CompetitorShare>,
  pub kpis:        KpiSummary,
}

impl Dataset {
  pub fn from_json(raw: &str) -> Result<Self> { Ok(serde_json::from_str(raw)?) }

  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let raw = std::fs::read_to_string(path)?;
    Self::from_json(&raw)
  }
}

const MONTH_LABELS: [&str; 12] = [
  "Jan", "Feb", "Mär", "Apr", "Mai", "Jun", "Jul", "Aug", "Sep", "Okt", "Nov", "Dez",
];

/// `"2025-05"` → `"Mai 25"`. Unparseable input is returned with the month
/// part untouched.
pub fn short_month(month: &str) -> String {
  let Some((year, mm)) = month.split_once('-') else {
    return month.to_owned();
  };
  let label = mm
    .parse::<usize>()
    .ok()
    .and_then(|m| m.checked_sub(1))
    .and_then(|i| MONTH_LABELS.get(i))
    .copied()
    .unwrap_or(mm);
  let yy = year.get(2..).unwrap_or(year);
  format!("{label} {yy}")
}

#[cfg(test)]
mod tests {
  use super::*;

  const SAMPLE: &str = r#"{
    "monthly": [
      {"month": "2025-01", "trx": 120, "trx_plan": 150, "nrx": 80, "rrx": 40,
       "net_revenue": 9000.0, "net_plan": 11000.0, "prescribers": 12}
    ],
    "regions": [
      {"region": "Nordrhein", "trx": 900, "trx_plan": 1000, "net_revenue": 60000.0, "market_share": 21.5}
    ],
    "competitors": [
      {"month": "2025-01", "cardiozan": 5.0, "forxiga": 45.0, "jardiance": 42.0, "invokana": 8.0}
    ],
    "kpis": {"cumulative_net_revenue": 512000.0, "cumulative_trx": 7900,
             "active_prescribers": 64, "market_share_latest": 22.4}
  }"#;

  #[test]
  fn parses_all_four_sections() {
    let d = Dataset::from_json(SAMPLE).unwrap();
    assert_eq!(d.monthly.len(), 1);
    assert_eq!(d.regions[0].region, "Nordrhein");
    assert_eq!(d.competitors[0].forxiga, 45.0);
    assert_eq!(d.kpis.active_prescribers, 64);
  }

  #[test]
  fn missing_section_is_an_error() {
    let err = Dataset::from_json(r#"{"monthly": [], "regions": [], "competitors": []}"#);
    assert!(err.is_err());
  }

  #[test]
  fn achievement_handles_zero_plan() {
    let d = Dataset::from_json(SAMPLE).unwrap();
    assert!((d.regions[0].achievement_pct() - 90.0).abs() < 1e-9);
    let mut r = d.regions[0].clone();
    r.trx_plan = 0;
    assert_eq!(r.achievement_pct(), 0.0);
  }

  #[test]
  fn short_month_labels() {
    assert_eq!(short_month("2025-05"), "Mai 25");
    assert_eq!(short_month("2024-03"), "Mär 24");
    assert_eq!(short_month("2025-13"), "13 25");
    assert_eq!(short_month("garbage"), "garbage");
  }
}
