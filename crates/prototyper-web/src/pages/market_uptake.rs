//! Market uptake: new vs. repeat prescriptions and the competitor landscape.

use axum::{
  extract::{Query, State},
  response::Html,
};
use prototyper_core::{
  dataset::{MonthlyRecord, short_month},
  store::FeedbackStore,
};

use super::{Page, PageContext, PageParams};
use crate::{
  AppState, Result,
  chart::{self, Series},
  html::{Kpi, kpi_row, section, thousands},
  theme::{C_ACCENT1, C_ACCENT2, C_FORXIGA, C_INVOKANA, C_JARDIANCE},
};

const PAGE: Page = Page::MarketUptake;

pub const NRX_RRX_CHART: &str = "nrx-rrx-chart";
pub const MARKET_SHARE_CHART: &str = "market-share-chart";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UptakeMetrics {
  pub cumulative_nrx:     u64,
  pub cumulative_rrx:     u64,
  /// RRx over all prescriptions, in percent.
  pub repeat_rate:        f64,
  pub latest_prescribers: u64,
}

impl UptakeMetrics {
  pub fn from_months(months: &[MonthlyRecord]) -> Self {
    let cumulative_nrx: u64 = months.iter().map(|m| m.nrx).sum();
    let cumulative_rrx: u64 = months.iter().map(|m| m.rrx).sum();
    let total = cumulative_nrx + cumulative_rrx;
    let repeat_rate = if total == 0 {
      0.0
    } else {
      cumulative_rrx as f64 / total as f64 * 100.0
    };
    Self {
      cumulative_nrx,
      cumulative_rrx,
      repeat_rate,
      latest_prescribers: months.last().map_or(0, |m| m.prescribers),
    }
  }

  pub fn kpis(&self) -> Vec<Kpi> {
    vec![
      Kpi::new("NRx kumuliert", thousands(self.cumulative_nrx)).sub("Neuverordnungen"),
      Kpi::new("RRx kumuliert", thousands(self.cumulative_rrx)).sub("Folgeverordnungen"),
      Kpi::new("Repeat-Rate", format!("{:.1}%", self.repeat_rate)).sub("RRx / (NRx + RRx)"),
      Kpi::new("Verordner aktuell", self.latest_prescribers.to_string()).sub("letzter Monat"),
    ]
  }
}

/// `GET /uptake`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<PageParams>,
) -> Result<Html<String>>
where
  S: FeedbackStore,
{
  let store = state.store.as_ref();
  let ctx = PageContext::load(store, PAGE, &params).await?;
  let data = &state.dataset;

  let months = &data.monthly;
  let labels: Vec<String> = months.iter().map(|m| short_month(&m.month)).collect();
  let nrx_rrx_chart = chart::stacked_bar_chart(
    &labels,
    &[
      Series::new("NRx", C_ACCENT1, months.iter().map(|m| m.nrx as f64)),
      Series::new("RRx", C_ACCENT2, months.iter().map(|m| m.rrx as f64)),
    ],
    None,
  )?;

  let shares = &data.competitors;
  let share_labels: Vec<String> = shares.iter().map(|c| short_month(&c.month)).collect();
  let share_chart = chart::stacked_bar_chart(
    &share_labels,
    &[
      Series::new("Cardiozan", C_ACCENT1, shares.iter().map(|c| c.cardiozan)),
      Series::new("Forxiga", C_FORXIGA, shares.iter().map(|c| c.forxiga)),
      Series::new("Jardiance", C_JARDIANCE, shares.iter().map(|c| c.jardiance)),
      Series::new("Invokana", C_INVOKANA, shares.iter().map(|c| c.invokana)),
    ],
    Some(100.0),
  )?;

  let nrx_rrx_widget = ctx.element_widget(store, NRX_RRX_CHART).await?;
  let share_widget = ctx.element_widget(store, MARKET_SHARE_CHART).await?;
  let feedback = ctx.feedback_section(store).await?;

  let body = format!(
    r#"{kpis}<div class="grid2">{nrx_rrx}{share}</div>{feedback}"#,
    kpis = kpi_row(&UptakeMetrics::from_months(months).kpis()),
    nrx_rrx = section(
      "NRx vs. RRx",
      "Neu- und Folgeverordnungen pro Monat",
      &nrx_rrx_widget,
      &nrx_rrx_chart,
    ),
    share = section(
      "Marktanteile SGLT2",
      "Anteil an allen Verordnungen der Klasse (%)",
      &share_widget,
      &share_chart,
    ),
  );
  Ok(ctx.render(&body))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn month(m: &str, nrx: u64, rrx: u64, prescribers: u64) -> MonthlyRecord {
    MonthlyRecord {
      month: m.into(),
      trx: nrx + rrx,
      trx_plan: 0,
      nrx,
      rrx,
      net_revenue: 0.0,
      net_plan: 0.0,
      prescribers,
    }
  }

  #[test]
  fn repeat_rate_over_all_months() {
    let m = UptakeMetrics::from_months(&[
      month("2025-01", 300, 100, 20),
      month("2025-02", 500, 600, 31),
    ]);
    assert_eq!(m.cumulative_nrx, 800);
    assert_eq!(m.cumulative_rrx, 700);
    assert!((m.repeat_rate - 700.0 / 1500.0 * 100.0).abs() < 1e-9);
    assert_eq!(m.latest_prescribers, 31);

    let cards = m.kpis();
    assert_eq!(cards[0].value, "800");
    assert_eq!(cards[2].value, "46.7%");
    assert_eq!(cards[3].value, "31");
  }

  #[test]
  fn no_months_means_zero_rate() {
    let m = UptakeMetrics::from_months(&[]);
    assert_eq!(m.repeat_rate, 0.0);
    assert_eq!(m.latest_prescribers, 0);
  }
}
