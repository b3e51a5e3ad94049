//! Palette and stylesheet shared by every page.

use plotters::style::RGBColor;

pub const TEXT_DIM: &str = "#9ca3af";
pub const GREEN: &str = "#059669";
pub const RED: &str = "#dc2626";
pub const YELLOW: &str = "#d97706";

// Chart colours.
pub const C_ACCENT1: RGBColor = RGBColor(0x25, 0x63, 0xeb);
pub const C_ACCENT2: RGBColor = RGBColor(0x08, 0x91, 0xb2);
pub const C_TEXT: RGBColor = RGBColor(0x1a, 0x20, 0x2c);
pub const C_TEXT_DIM: RGBColor = RGBColor(0x9c, 0xa3, 0xaf);
pub const C_PLAN: RGBColor = RGBColor(0x37, 0x41, 0x51);
pub const C_GRID: RGBColor = RGBColor(0xe5, 0xe7, 0xeb);
pub const C_FORXIGA: RGBColor = RGBColor(0x64, 0x74, 0x8b);
pub const C_JARDIANCE: RGBColor = RGBColor(0x78, 0x71, 0x6c);
pub const C_INVOKANA: RGBColor = RGBColor(0x94, 0xa3, 0xb8);

/// Green at or above plan, yellow from 80 %, red below.
pub fn achievement_color(pct: f64) -> &'static str {
  if pct >= 100.0 {
    GREEN
  } else if pct >= 80.0 {
    YELLOW
  } else {
    RED
  }
}

/// Green for a non-negative delta, red otherwise.
pub fn trend_color(delta: f64) -> &'static str { if delta >= 0.0 { GREEN } else { RED } }

pub const STYLESHEET: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; background: #f5f6f8; color: #1a202c;
  font-family: 'DM Sans', -apple-system, sans-serif; font-size: 14px; }
a { color: #2563eb; text-decoration: none; }
.shell { display: flex; min-height: 100vh; }
.sidebar { width: 260px; background: #f0f2f5; border-right: 1px solid #e2e5ea; padding: 20px 16px; }
.brand { font-size: 18px; font-weight: 700; }
.brand small { display: block; font-size: 12px; color: #6b7280; font-weight: 400;
  font-family: 'JetBrains Mono', monospace; margin-top: 2px; }
.nav-group { margin: 18px 0 6px; font-size: 11px; font-weight: 700; text-transform: uppercase;
  color: #9ca3af; letter-spacing: 0.5px; }
.nav a { display: block; padding: 6px 10px; border-radius: 6px; color: #1a202c; }
.nav a.active { background: #2563eb12; color: #2563eb; font-weight: 700; }
.rounds a { display: block; padding: 5px 10px; border-radius: 6px; color: #6b7280; font-size: 13px; }
.rounds a.active { border: 1.5px solid #2563eb; color: #2563eb; font-weight: 700; }
.stats { background: #fff; border: 1px solid #e2e5ea; border-radius: 8px; padding: 12px;
  font-size: 12px; margin-top: 16px; }
.stats div { display: flex; justify-content: space-between; margin-bottom: 4px; }
.stats .empty { color: #9ca3af; text-align: center; display: block; }
.main { flex: 1; padding: 24px 32px; max-width: 1240px; }
.notice { background: #dc262610; border: 1px solid #dc262644; color: #dc2626; padding: 10px 14px;
  border-radius: 8px; margin-bottom: 16px; }
.kpis { display: grid; grid-template-columns: repeat(4, 1fr); gap: 12px; margin-bottom: 16px; }
.kpi { background: #fff; border: 1px solid #e2e5ea; border-radius: 10px; padding: 12px 16px; }
.kpi .label { font-size: 11px; font-weight: 600; text-transform: uppercase; letter-spacing: 0.5px;
  color: #6b7280; }
.kpi .value { font-family: 'JetBrains Mono', monospace; font-size: 26px; font-weight: 700; }
.kpi .sub { font-size: 12px; color: #9ca3af; }
.kpi .trend { font-size: 12px; font-weight: 700; margin-left: 6px; }
.grid2 { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
.grid32 { display: grid; grid-template-columns: 3fr 2fr; gap: 16px; }
.section-card { background: #fff; border: 1px solid #e2e5ea; border-radius: 10px; padding: 16px;
  margin-bottom: 16px; }
.section-head { display: flex; justify-content: space-between; align-items: flex-start; }
.section-title { font-size: 15px; font-weight: 700; }
.section-sub { font-size: 12px; color: #6b7280; margin-bottom: 8px; }
.chart svg { width: 100%; height: auto; }
table.detail { width: 100%; border-collapse: collapse; font-size: 13px; }
table.detail th { padding: 8px; text-align: right; font-size: 10px; font-weight: 700;
  text-transform: uppercase; color: #6b7280; border-bottom: 2px solid #e2e5ea; }
table.detail td { padding: 6px 8px; text-align: right; font-family: 'JetBrains Mono', monospace;
  font-size: 12px; }
table.detail th:first-child, table.detail td:first-child { text-align: left;
  font-family: 'DM Sans', sans-serif; font-weight: 500; }
details.bubble { position: relative; }
details.bubble > summary { list-style: none; cursor: pointer; padding: 3px 8px; border-radius: 5px;
  border: 1px solid #e2e5ea; font-size: 12px; font-weight: 600; color: #9ca3af; }
details.bubble.has > summary { color: #d97706; background: #d9770610; }
details.bubble > .pop { position: absolute; right: 0; top: 100%; margin-top: 6px; width: 340px;
  background: #fff; border: 1px solid #e2e5ea; border-radius: 10px; padding: 16px; z-index: 10;
  box-shadow: 0 8px 32px rgba(0,0,0,0.12); max-height: 480px; overflow-y: auto; }
form.feedback { display: flex; flex-direction: column; gap: 8px; }
form.feedback input, form.feedback textarea, form.feedback select { padding: 6px 10px;
  border-radius: 5px; border: 1px solid #e2e5ea; font: inherit; }
button { padding: 6px 12px; border-radius: 6px; border: 1px solid #e2e5ea; background: #fff;
  cursor: pointer; font: inherit; }
button.primary { background: #2563eb; color: #fff; border-color: #2563eb; }
.history-title { font-size: 12px; font-weight: 600; color: #6b7280; text-transform: uppercase;
  margin: 16px 0 8px; letter-spacing: 0.5px; }
.feedback-item { display: flex; gap: 12px; align-items: flex-start; background: #fff;
  border: 1px solid #e2e5ea; border-radius: 8px; padding: 10px 12px; margin-bottom: 8px; }
.feedback-item.resolved { opacity: 0.55; }
.feedback-author { font-weight: 600; }
.feedback-round, .tag { font-family: 'JetBrains Mono', monospace; font-size: 11px; font-weight: 600;
  background: #2563eb12; color: #2563eb; padding: 2px 8px; border-radius: 4px; }
.tag.page { background: #f0f2f5; color: #6b7280; font-family: inherit; }
.feedback-stars { color: #d97706; }
.feedback-comment { margin: 4px 0; white-space: pre-wrap; }
.feedback-time { font-size: 11px; color: #9ca3af; }
.filters { display: flex; gap: 12px; align-items: flex-end; flex-wrap: wrap; }
.filters label { display: flex; flex-direction: column; font-size: 12px; color: #6b7280; gap: 4px; }
.empty-state { text-align: center; padding: 40px; color: #6b7280; }
"#;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn achievement_thresholds() {
    assert_eq!(achievement_color(100.0), GREEN);
    assert_eq!(achievement_color(99.9), YELLOW);
    assert_eq!(achievement_color(80.0), YELLOW);
    assert_eq!(achievement_color(79.9), RED);
  }

  #[test]
  fn trend_sign() {
    assert_eq!(trend_color(0.0), GREEN);
    assert_eq!(trend_color(-0.1), RED);
  }
}
