//! Executive summary: headline KPIs against target, TRx trend and monthly
//! net revenue.

use axum::{
  extract::{Query, State},
  response::Html,
};
use prototyper_core::{
  dataset::{KpiSummary, short_month},
  store::FeedbackStore,
};

use super::{Page, PageContext, PageParams};
use crate::{
  AppState, Result,
  chart::{self, Series},
  html::{Kpi, euro, kpi_row, section, thousands},
  theme::{C_ACCENT1, C_TEXT_DIM, trend_color},
};

const PAGE: Page = Page::ExecSummary;

pub const TRX_CHART: &str = "trx-chart";
pub const REVENUE_CHART: &str = "revenue-chart";

pub const REVENUE_TARGET: f64 = 600_000.0;
pub const TRX_TARGET: u64 = 8_500;
pub const PRESCRIBER_TARGET: u64 = 70;
/// Percent.
pub const SHARE_TARGET: f64 = 25.0;

/// Relative deviation from target in percent.
fn delta_pct(actual: f64, target: f64) -> f64 { (actual / target - 1.0) * 100.0 }

pub fn kpis(k: &KpiSummary) -> Vec<Kpi> {
  let revenue = delta_pct(k.cumulative_net_revenue, REVENUE_TARGET);
  let trx = delta_pct(k.cumulative_trx as f64, TRX_TARGET as f64);
  let prescribers = delta_pct(k.active_prescribers as f64, PRESCRIBER_TARGET as f64);
  let share = k.market_share_latest - SHARE_TARGET;

  vec![
    Kpi::new("Net Revenue kum.", euro(k.cumulative_net_revenue))
      .sub(format!("Ziel: {}", euro(REVENUE_TARGET)))
      .trend(format!("{revenue:+.1}%"), trend_color(revenue)),
    Kpi::new("TRx kumuliert", thousands(k.cumulative_trx))
      .sub(format!("Ziel: {}", thousands(TRX_TARGET)))
      .trend(format!("{trx:+.1}%"), trend_color(trx)),
    Kpi::new("Aktive Verordner", k.active_prescribers.to_string())
      .sub(format!("Ziel: {PRESCRIBER_TARGET}"))
      .trend(format!("{prescribers:+.1}%"), trend_color(prescribers)),
    Kpi::new("Marktanteil", format!("{:.1}%", k.market_share_latest))
      .sub(format!("Ziel: {SHARE_TARGET:.0}%"))
      .trend(format!("{share:+.1}pp"), trend_color(share)),
  ]
}

/// `GET /` and `GET /exec`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<PageParams>,
) -> Result<Html<String>>
where
  S: FeedbackStore,
{
  let store = state.store.as_ref();
  let ctx = PageContext::load(store, PAGE, &params).await?;
  let months = &state.dataset.monthly;
  let labels: Vec<String> = months.iter().map(|m| short_month(&m.month)).collect();

  let trx_chart = chart::line_chart(&labels, &[
    Series::new("Ist", C_ACCENT1, months.iter().map(|m| m.trx as f64)),
    Series::new("Plan", C_TEXT_DIM, months.iter().map(|m| m.trx_plan as f64)),
  ])?;
  let revenue_chart = chart::grouped_bar_chart(&labels, &[
    Series::new("Ist", C_ACCENT1, months.iter().map(|m| m.net_revenue)),
    Series::new("Plan", C_TEXT_DIM, months.iter().map(|m| m.net_plan)),
  ])?;

  let trx_widget = ctx.element_widget(store, TRX_CHART).await?;
  let revenue_widget = ctx.element_widget(store, REVENUE_CHART).await?;
  let feedback = ctx.feedback_section(store).await?;

  let body = format!(
    r#"{kpis}<div class="grid2">{trx}{revenue}</div>{feedback}"#,
    kpis = kpi_row(&kpis(&state.dataset.kpis)),
    trx = section(
      "TRx Entwicklung",
      "Ist vs. Plan, monatliche Verordnungen",
      &trx_widget,
      &trx_chart,
    ),
    revenue = section("Net Revenue", "Monatlich Ist vs. Plan (€)", &revenue_widget, &revenue_chart),
  );
  Ok(ctx.render(&body))
}
