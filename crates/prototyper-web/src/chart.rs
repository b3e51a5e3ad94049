//! Inline SVG charts drawn with plotters.
//!
//! Categories sit on integer positions of an `f64` axis so bars can be placed
//! side by side inside one slot; tick labels map those positions back to the
//! category names.

use plotters::{
  coord::{Shift, types::RangedCoordf64},
  prelude::*,
};

use crate::{
  Result,
  error::Error,
  theme::{C_GRID, C_PLAN, C_TEXT},
};

type DrawResult<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Default chart size in SVG user units.
const SIZE: (u32, u32) = (560, 280);

/// One named data series, one value per category.
#[derive(Debug, Clone)]
pub struct Series<'a> {
  pub name:   &'a str,
  pub values: Vec<f64>,
  pub color:  RGBColor,
}

impl<'a> Series<'a> {
  pub fn new(name: &'a str, color: RGBColor, values: impl IntoIterator<Item = f64>) -> Self {
    Self { name, values: values.into_iter().collect(), color }
  }
}

fn render<F>(size: (u32, u32), draw: F) -> Result<String>
where
  F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> DrawResult<()>,
{
  let mut svg = String::new();
  {
    let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
    draw(&root)
      .and_then(|()| root.present().map_err(Into::into))
      .map_err(|e| Error::Chart(e.to_string()))?;
  }
  Ok(svg)
}

/// Tick label for an axis position; blank between categories.
fn category_label(labels: &[String], pos: f64) -> String {
  let idx = pos.round();
  if (pos - idx).abs() > 1e-6 || idx < 0.0 {
    return String::new();
  }
  labels.get(idx as usize).cloned().unwrap_or_default()
}

fn compact(v: f64) -> String {
  let a = v.abs();
  if a >= 10_000.0 {
    format!("{:.0}k", v / 1000.0)
  } else if a >= 1000.0 {
    format!("{:.1}k", v / 1000.0)
  } else {
    format!("{v:.0}")
  }
}

/// Headroom above the tallest value; never a zero-height axis.
fn axis_max(max: f64) -> f64 { if max > 0.0 { max * 1.1 } else { 1.0 } }

fn series_max<'s>(series: impl IntoIterator<Item = &'s Series<'s>>) -> f64 {
  series
    .into_iter()
    .flat_map(|s| s.values.iter().copied())
    .fold(0.0, f64::max)
}

fn category_range(n: usize) -> std::ops::Range<f64> { -0.5..(n.max(1) as f64 - 0.5) }

type Chart<'a, 'b> = ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_legend<'a, 'b: 'a>(chart: &mut Chart<'a, 'b>, position: SeriesLabelPosition) -> DrawResult<()> {
  chart
    .configure_series_labels()
    .position(position)
    .background_style(WHITE.mix(0.85))
    .border_style(C_GRID)
    .label_font(("sans-serif", 11))
    .draw()?;
  Ok(())
}

// ─── Vertical charts ─────────────────────────────────────────────────────────

/// Lines with point markers; the first series is drawn heavier.
pub fn line_chart(labels: &[String], series: &[Series<'_>]) -> Result<String> {
  render(SIZE, |root| {
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
      .margin(12)
      .x_label_area_size(28)
      .y_label_area_size(52)
      .build_cartesian_2d(category_range(labels.len()), 0f64..axis_max(series_max(series)))?;

    let x_fmt = |x: &f64| category_label(labels, *x);
    let y_fmt = |y: &f64| compact(*y);
    chart
      .configure_mesh()
      .disable_x_mesh()
      .bold_line_style(C_GRID)
      .x_labels(labels.len().max(1))
      .x_label_formatter(&x_fmt)
      .y_label_formatter(&y_fmt)
      .label_style(("sans-serif", 11))
      .axis_style(C_TEXT.mix(0.4))
      .draw()?;

    for (i, s) in series.iter().enumerate() {
      let color = s.color;
      let width = if i == 0 { 2 } else { 1 };
      let points = s.values.iter().enumerate().map(|(x, y)| (x as f64, *y));
      chart
        .draw_series(LineSeries::new(points.clone(), color.stroke_width(width)))?
        .label(s.name)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 14, y)], color.stroke_width(2)));
      if i == 0 {
        chart.draw_series(points.map(|p| Circle::new(p, 3, color.filled())))?;
      }
    }
    draw_legend(&mut chart, SeriesLabelPosition::UpperLeft)
  })
}

/// Bars of every series next to each other inside one category slot.
pub fn grouped_bar_chart(labels: &[String], series: &[Series<'_>]) -> Result<String> {
  render(SIZE, |root| {
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
      .margin(12)
      .x_label_area_size(28)
      .y_label_area_size(52)
      .build_cartesian_2d(category_range(labels.len()), 0f64..axis_max(series_max(series)))?;

    let x_fmt = |x: &f64| category_label(labels, *x);
    let y_fmt = |y: &f64| compact(*y);
    chart
      .configure_mesh()
      .disable_x_mesh()
      .bold_line_style(C_GRID)
      .x_labels(labels.len().max(1))
      .x_label_formatter(&x_fmt)
      .y_label_formatter(&y_fmt)
      .label_style(("sans-serif", 11))
      .draw()?;

    let slot = 0.8 / series.len().max(1) as f64;
    for (i, s) in series.iter().enumerate() {
      let color = s.color;
      let offset = -0.4 + slot * i as f64;
      chart
        .draw_series(s.values.iter().enumerate().map(|(x, v)| {
          let x0 = x as f64 + offset;
          Rectangle::new([(x0, 0.0), (x0 + slot * 0.9, *v)], color.filled())
        }))?
        .label(s.name)
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    draw_legend(&mut chart, SeriesLabelPosition::UpperLeft)
  })
}

/// Series stacked bottom-up in the order given. `y_max` fixes the axis
/// (e.g. 100 for shares); otherwise it follows the tallest stack.
pub fn stacked_bar_chart(
  labels: &[String],
  series: &[Series<'_>],
  y_max: Option<f64>,
) -> Result<String> {
  let totals: Vec<f64> = (0..labels.len())
    .map(|i| series.iter().filter_map(|s| s.values.get(i)).sum())
    .collect();
  let top = y_max.unwrap_or_else(|| axis_max(totals.iter().copied().fold(0.0, f64::max)));

  render(SIZE, |root| {
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
      .margin(12)
      .x_label_area_size(28)
      .y_label_area_size(52)
      .build_cartesian_2d(category_range(labels.len()), 0f64..top)?;

    let x_fmt = |x: &f64| category_label(labels, *x);
    let y_fmt = |y: &f64| compact(*y);
    chart
      .configure_mesh()
      .disable_x_mesh()
      .bold_line_style(C_GRID)
      .x_labels(labels.len().max(1))
      .x_label_formatter(&x_fmt)
      .y_label_formatter(&y_fmt)
      .label_style(("sans-serif", 11))
      .draw()?;

    let mut base = vec![0.0; labels.len()];
    for s in series {
      let color = s.color;
      let bars: Vec<_> = s
        .values
        .iter()
        .zip(base.iter_mut())
        .enumerate()
        .map(|(x, (v, b))| {
          let x = x as f64;
          let bar = Rectangle::new([(x - 0.35, *b), (x + 0.35, *b + v)], color.filled());
          *b += v;
          bar
        })
        .collect();
      chart
        .draw_series(bars)?
        .label(s.name)
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }
    draw_legend(&mut chart, SeriesLabelPosition::UpperLeft)
  })
}

// ─── Horizontal chart ────────────────────────────────────────────────────────

/// Plan bars behind narrower actual bars, one row per label, first label at
/// the top.
pub fn plan_actual_bars(labels: &[String], plan: &Series<'_>, actual: &Series<'_>) -> Result<String> {
  let height = (labels.len() as u32 * 28 + 60).max(320);
  let x_top = axis_max(series_max([plan, actual]));
  // Rows are drawn bottom-up, so reverse to keep the caller's order on screen.
  let rows: Vec<String> = labels.iter().rev().cloned().collect();
  let n = rows.len();
  let flip = |i: usize| n.saturating_sub(i + 1) as f64;

  render((SIZE.0, height), |root| {
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
      .margin(12)
      .x_label_area_size(28)
      .y_label_area_size(150)
      .build_cartesian_2d(0f64..x_top, category_range(n))?;

    let y_fmt = |y: &f64| category_label(&rows, *y);
    let x_fmt = |x: &f64| compact(*x);
    chart
      .configure_mesh()
      .disable_y_mesh()
      .bold_line_style(C_GRID)
      .y_labels(n.max(1))
      .y_label_formatter(&y_fmt)
      .x_label_formatter(&x_fmt)
      .label_style(("sans-serif", 11))
      .draw()?;

    let plan_style = C_PLAN.mix(0.25).filled();
    chart
      .draw_series(plan.values.iter().enumerate().map(|(i, v)| {
        let y = flip(i);
        Rectangle::new([(0.0, y - 0.38), (*v, y + 0.38)], plan_style)
      }))?
      .label(plan.name)
      .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], plan_style));

    let color = actual.color;
    chart
      .draw_series(actual.values.iter().enumerate().map(|(i, v)| {
        let y = flip(i);
        Rectangle::new([(0.0, y - 0.22), (*v, y + 0.22)], color.filled())
      }))?
      .label(actual.name)
      .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));

    draw_legend(&mut chart, SeriesLabelPosition::LowerRight)
  })
}
