//! Regional performance across the KV regions.

use axum::{
  extract::{Query, State},
  response::Html,
};
use prototyper_core::{dataset::RegionRecord, store::FeedbackStore};

use super::{Page, PageContext, PageParams};
use crate::{
  AppState, Result,
  chart::{self, Series},
  html::{Kpi, esc, euro, kpi_row, section, thousands},
  theme::{C_ACCENT1, C_PLAN, achievement_color},
};

const PAGE: Page = Page::RegionalView;

pub const REGION_CHART: &str = "region-chart";
pub const REGION_TABLE: &str = "region-table";

#[derive(Debug, Clone, PartialEq)]
pub struct RegionalMetrics {
  pub total_trx:       u64,
  pub total_plan:      u64,
  pub achievement_pct: f64,
  /// Share of all TRx held by the three strongest regions, in percent.
  pub top3_share:      f64,
  /// Sorted by TRx, descending.
  pub regions:         Vec<RegionRecord>,
}

impl RegionalMetrics {
  pub fn from_regions(regions: &[RegionRecord]) -> Self {
    let mut regions = regions.to_vec();
    regions.sort_by(|a, b| b.trx.cmp(&a.trx).then_with(|| a.region.cmp(&b.region)));

    let total_trx: u64 = regions.iter().map(|r| r.trx).sum();
    let total_plan: u64 = regions.iter().map(|r| r.trx_plan).sum();
    let top3: u64 = regions.iter().take(3).map(|r| r.trx).sum();
    let pct = |part: u64, whole: u64| {
      if whole == 0 { 0.0 } else { part as f64 / whole as f64 * 100.0 }
    };

    Self {
      total_trx,
      total_plan,
      achievement_pct: pct(total_trx, total_plan),
      top3_share: pct(top3, total_trx),
      regions,
    }
  }

  pub fn kpis(&self) -> Vec<Kpi> {
    vec![
      Kpi::new("TRx Gesamt", thousands(self.total_trx)).sub("alle KV-Regionen · kumuliert"),
      Kpi::new("Plan Gesamt", thousands(self.total_plan)),
      Kpi::new("Zielerreichung", format!("{:.0}%", self.achievement_pct))
        .sub("Ist / Plan")
        .color(achievement_color(self.achievement_pct)),
      Kpi::new("Top-3 Konzentration", format!("{:.0}%", self.top3_share))
        .sub("Anteil der 3 stärksten Regionen"),
    ]
  }
}

fn detail_table(regions: &[RegionRecord]) -> String {
  let mut out = String::from(
    r#"<table class="detail"><thead><tr><th>Region</th><th>TRx</th><th>Plan</th><th>Erzielt</th><th>Net Rev</th><th>MS</th></tr></thead><tbody>"#,
  );
  for r in regions {
    let pct = r.achievement_pct();
    out.push_str(&format!(
      r#"<tr><td>{}</td><td>{}</td><td>{}</td><td style="color:{};font-weight:700">{:.0}%</td><td>{}</td><td>{:.1}%</td></tr>"#,
      esc(&r.region),
      thousands(r.trx),
      thousands(r.trx_plan),
      achievement_color(pct),
      pct,
      euro(r.net_revenue),
      r.market_share,
    ));
  }
  out.push_str("</tbody></table>");
  out
}

/// `GET /regional`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<PageParams>,
) -> Result<Html<String>>
where
  S: FeedbackStore,
{
  let store = state.store.as_ref();
  let ctx = PageContext::load(store, PAGE, &params).await?;
  let metrics = RegionalMetrics::from_regions(&state.dataset.regions);

  let labels: Vec<String> = metrics.regions.iter().map(|r| r.region.clone()).collect();
  let region_chart = chart::plan_actual_bars(
    &labels,
    &Series::new("Plan", C_PLAN, metrics.regions.iter().map(|r| r.trx_plan as f64)),
    &Series::new("Ist", C_ACCENT1, metrics.regions.iter().map(|r| r.trx as f64)),
  )?;

  let chart_widget = ctx.element_widget(store, REGION_CHART).await?;
  let table_widget = ctx.element_widget(store, REGION_TABLE).await?;
  let feedback = ctx.feedback_section(store).await?;

  let body = format!(
    r#"{kpis}<div class="grid32">{chart}{table}</div>{feedback}"#,
    kpis = kpi_row(&metrics.kpis()),
    chart = section("TRx nach KV-Region", "Ist vs. Plan, kumuliert", &chart_widget, &region_chart),
    table = section(
      "Detailtabelle",
      "sortiert nach TRx",
      &table_widget,
      &detail_table(&metrics.regions),
    ),
  );
  Ok(ctx.render(&body))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::theme::{GREEN, RED, YELLOW};

  fn region(name: &str, trx: u64, plan: u64) -> RegionRecord {
    RegionRecord {
      region:       name.into(),
      trx,
      trx_plan:     plan,
      net_revenue:  trx as f64 * 70.0,
      market_share: 20.0,
    }
  }

  #[test]
  fn totals_sorting_and_concentration() {
    let m = RegionalMetrics::from_regions(&[
      region("Bremen", 100, 100),
      region("Bayern", 400, 380),
      region("Hessen", 200, 250),
      region("Nordrhein", 300, 270),
    ]);
    let order: Vec<_> = m.regions.iter().map(|r| r.region.as_str()).collect();
    assert_eq!(order, ["Bayern", "Nordrhein", "Hessen", "Bremen"]);
    assert_eq!(m.total_trx, 1000);
    assert_eq!(m.total_plan, 1000);
    assert!((m.achievement_pct - 100.0).abs() < 1e-9);
    assert!((m.top3_share - 90.0).abs() < 1e-9);

    let cards = m.kpis();
    assert_eq!(cards[0].value, "1.000");
    assert_eq!(cards[2].value, "100%");
    assert_eq!(cards[2].color, Some(GREEN));
    assert_eq!(cards[3].value, "90%");
  }

  #[test]
  fn achievement_bands() {
    let m = RegionalMetrics::from_regions(&[region("A", 85, 100)]);
    assert_eq!(m.kpis()[2].color, Some(YELLOW));
    let m = RegionalMetrics::from_regions(&[region("A", 50, 100)]);
    assert_eq!(m.kpis()[2].color, Some(RED));
  }

  #[test]
  fn empty_regions_do_not_divide_by_zero() {
    let m = RegionalMetrics::from_regions(&[]);
    assert_eq!(m.achievement_pct, 0.0);
    assert_eq!(m.top3_share, 0.0);
  }

  #[test]
  fn table_escapes_region_names() {
    let html = detail_table(&[region("<Saar>", 90, 100)]);
    assert!(html.contains("&lt;Saar&gt;"));
    assert!(html.contains("90%"));
  }
}
