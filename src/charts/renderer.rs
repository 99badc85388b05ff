//! Static Chart Renderer
//! Renders a finished view to a PNG file with plotters.
//!
//! Layout per view kind:
//! - Transmission: grouped bars, one color per gender
//! - Daily cases: line over dates
//! - State wise: donut with legend, no slice text
//! - Age wise: centered funnel bars
//! - Case emergence: multi-series scatter
//! - Patient status: pie with percentage slice text

use crate::charts::plotter::{date_to_x, shares, x_to_date_label};
use crate::views::{AggregateView, CategoryView, ScatterView, ViewKind};
use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::TAU;
use std::path::Path;
use thiserror::Error;

const FONT: &str = "sans-serif";

// Same hues as the interactive palette
const PALETTE: [RGBColor; 10] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(155, 89, 182),
    RGBColor(243, 156, 18),
    RGBColor(26, 188, 156),
    RGBColor(233, 30, 99),
    RGBColor(0, 188, 212),
    RGBColor(121, 85, 72),
    RGBColor(96, 125, 139),
];

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

fn color(index: usize) -> RGBColor {
    PALETTE[index % PALETTE.len()]
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Upper bound of a count axis with some headroom.
pub fn axis_top(max: u64) -> f64 {
    (max as f64 * 1.1).max(1.0)
}

/// Outline of a pie slice: the center followed by points along the arc.
pub fn slice_polygon(center: (i32, i32), radius: f64, start: f64, sweep: f64) -> Vec<(i32, i32)> {
    let steps = ((sweep / TAU) * 180.0).ceil().max(1.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push(center);
    for s in 0..=steps {
        let a = start + sweep * s as f64 / steps as f64;
        points.push((
            center.0 + (radius * a.cos()).round() as i32,
            center.1 + (radius * a.sin()).round() as i32,
        ));
    }
    points
}

/// Label of the integer tick `x` in `labels`, blank between ticks.
fn tick_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < labels.len() {
        labels[idx as usize].clone()
    } else {
        String::new()
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render one view to `path` as a `width` x `height` PNG.
    pub fn render_png(
        kind: ViewKind,
        view: &AggregateView,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let area = root.titled(kind.title(), (FONT, 28)).map_err(draw_err)?;

        if view.is_empty() {
            Self::draw_no_data(&area)?;
        } else {
            match (kind, view) {
                (ViewKind::DailyCases, AggregateView::Category(v)) => Self::draw_line(&area, v)?,
                (ViewKind::StateWise, AggregateView::Category(v)) => {
                    Self::draw_pie(&area, v, 0.3, false)?
                }
                (ViewKind::AgeWise, AggregateView::Category(v)) => Self::draw_funnel(&area, v)?,
                (ViewKind::PatientStatus, AggregateView::Category(v)) => {
                    Self::draw_pie(&area, v, 0.0, true)?
                }
                (_, AggregateView::Category(v)) => Self::draw_grouped_bars(&area, v)?,
                (_, AggregateView::Scatter(v)) => Self::draw_scatter(&area, v)?,
            }
        }

        root.present().map_err(draw_err)?;
        tracing::info!("rendered {} to {}", kind.code(), path.display());
        Ok(())
    }

    fn draw_no_data(area: &Area) -> Result<(), RenderError> {
        let (w, h) = area.dim_in_pixel();
        let style =
            TextStyle::from((FONT, 24).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new("No Data", (w as i32 / 2, h as i32 / 2), style))
            .map_err(draw_err)
    }

    fn draw_grouped_bars(area: &Area, view: &CategoryView) -> Result<(), RenderError> {
        let n = view.labels.len();
        let n_series = view.series.len().max(1);
        let bar_width = 0.8 / n_series as f64;
        let max = view
            .series
            .iter()
            .flat_map(|s| s.values.iter().copied())
            .max()
            .unwrap_or(0);

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..n as f64 - 0.5, 0f64..axis_top(max))
            .map_err(draw_err)?;

        let labels = view.labels.clone();
        let fmt = |x: &f64| tick_label(&labels, *x);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&fmt)
            .y_desc("Cases")
            .draw()
            .map_err(draw_err)?;

        for (si, series) in view.series.iter().enumerate() {
            let c = color(si);
            let offset = (si as f64 - (n_series as f64 - 1.0) / 2.0) * bar_width;
            chart
                .draw_series(series.values.iter().enumerate().map(|(li, &v)| {
                    let x0 = li as f64 + offset - bar_width / 2.0;
                    Rectangle::new([(x0, 0.0), (x0 + bar_width, v as f64)], c.filled())
                }))
                .map_err(draw_err)?
                .label(series.name.clone())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], c.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)
    }

    fn draw_line(area: &Area, view: &CategoryView) -> Result<(), RenderError> {
        let Some(series) = view.series.first() else {
            return Self::draw_no_data(area);
        };
        let points: Vec<(f64, f64)> = view
            .labels
            .iter()
            .zip(series.values.iter())
            .filter_map(|(label, &v)| {
                NaiveDate::parse_from_str(label, "%Y-%m-%d")
                    .ok()
                    .map(|d| (date_to_x(d), v as f64))
            })
            .collect();
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return Self::draw_no_data(area);
        };
        let max = series.values.iter().copied().max().unwrap_or(0);

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(first.0..last.0.max(first.0 + 1.0), 0f64..axis_top(max))
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_label_formatter(&|x| x_to_date_label(*x))
            .x_desc("Date")
            .y_desc("No of cases")
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color(0).stroke_width(2)))
            .map_err(draw_err)?;
        Ok(())
    }

    fn draw_pie(
        area: &Area,
        view: &CategoryView,
        hole: f64,
        slice_text: bool,
    ) -> Result<(), RenderError> {
        let pairs = view.pairs();
        let values: Vec<u64> = pairs.iter().map(|(_, v)| *v).collect();
        let total: u64 = values.iter().sum();
        if total == 0 {
            return Self::draw_no_data(area);
        }
        let pct = shares(&values);

        let (w, _) = area.dim_in_pixel();
        let (pie_area, legend_area) = area.split_horizontally((w * 2 / 3) as i32);
        let (pw, ph) = pie_area.dim_in_pixel();
        let center = (pw as i32 / 2, ph as i32 / 2);
        let radius = pw.min(ph) as f64 * 0.42;

        let slice_style = TextStyle::from((FONT, 15).into_font())
            .color(&WHITE)
            .pos(Pos::new(HPos::Center, VPos::Center));

        let mut start = -TAU / 4.0;
        for (i, &v) in values.iter().enumerate() {
            let sweep = TAU * v as f64 / total as f64;
            pie_area
                .draw(&Polygon::new(
                    slice_polygon(center, radius, start, sweep),
                    color(i).filled(),
                ))
                .map_err(draw_err)?;

            if slice_text && pct[i] >= 3.0 {
                let mid = start + sweep / 2.0;
                let r = radius * (0.5 + hole / 2.0).max(0.6);
                let pos = (
                    center.0 + (r * mid.cos()).round() as i32,
                    center.1 + (r * mid.sin()).round() as i32,
                );
                pie_area
                    .draw(&Text::new(format!("{:.1}%", pct[i]), pos, slice_style.clone()))
                    .map_err(draw_err)?;
            }
            start += sweep;
        }

        if hole > 0.0 {
            pie_area
                .draw(&Circle::new(center, (radius * hole) as i32, WHITE.filled()))
                .map_err(draw_err)?;
        }

        let row_h = 22;
        for (i, (label, v)) in pairs.iter().enumerate() {
            let y = 20 + i as i32 * row_h;
            legend_area
                .draw(&Rectangle::new([(10, y), (24, y + 14)], color(i).filled()))
                .map_err(draw_err)?;
            legend_area
                .draw(&Text::new(format!("{label} ({v})"), (32, y), (FONT, 15).into_font()))
                .map_err(draw_err)?;
        }
        Ok(())
    }

    fn draw_funnel(area: &Area, view: &CategoryView) -> Result<(), RenderError> {
        let pairs = view.pairs();
        let n = pairs.len();
        let max = pairs.iter().map(|(_, v)| *v).max().unwrap_or(0);
        let half = axis_top(max) / 2.0;

        let mut chart = ChartBuilder::on(area)
            .margin(30)
            .build_cartesian_2d(-half..half, 0f64..n as f64)
            .map_err(draw_err)?;

        let text_style =
            TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Center));

        for (i, (label, v)) in pairs.iter().enumerate() {
            let v = *v as f64;
            let y = (n - 1 - i) as f64;
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(-v / 2.0, y + 0.05), (v / 2.0, y + 0.95)],
                    color(i).filled(),
                )))
                .map_err(draw_err)?;
            chart
                .draw_series(std::iter::once(Text::new(
                    format!("{label}: {}", v as u64),
                    (0.0, y + 0.5),
                    text_style.clone(),
                )))
                .map_err(draw_err)?;
        }
        Ok(())
    }

    fn draw_scatter(area: &Area, view: &ScatterView) -> Result<(), RenderError> {
        let Some((first, last)) = view.date_range() else {
            return Self::draw_no_data(area);
        };
        let max = view
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.1))
            .max()
            .unwrap_or(0);
        let (x0, x1) = (date_to_x(first) - 1.0, date_to_x(last) + 1.0);

        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x0..x1, 0f64..axis_top(max))
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_label_formatter(&|x| x_to_date_label(*x))
            .x_desc("Date")
            .y_desc("Case No")
            .draw()
            .map_err(draw_err)?;

        for (i, series) in view.series.iter().enumerate() {
            let c = color(i);
            chart
                .draw_series(series.points.iter().map(|(d, ordinal)| {
                    Circle::new((date_to_x(*d), *ordinal as f64), 4, c.mix(0.7).filled())
                }))
                .map_err(draw_err)?
                .label(series.name.clone())
                .legend(move |(x, y)| Circle::new((x + 5, y), 4, c.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_polygon_starts_at_center_and_follows_arc() {
        let pts = slice_polygon((100, 100), 50.0, 0.0, TAU / 4.0);
        assert_eq!(pts[0], (100, 100));
        assert_eq!(pts[1], (150, 100));
        assert_eq!(*pts.last().unwrap(), (100, 150));
    }

    #[test]
    fn tick_labels_only_on_integers() {
        let labels = vec!["Imported".to_string(), "Local".to_string()];
        assert_eq!(tick_label(&labels, 1.0), "Local");
        assert_eq!(tick_label(&labels, 0.5), "");
        assert_eq!(tick_label(&labels, 2.0), "");
        assert_eq!(tick_label(&labels, -1.0), "");
    }

    fn sample_views() -> crate::views::DashboardViews {
        use crate::data::{CaseRecord, CaseTable};
        let d = |day| NaiveDate::from_ymd_opt(2020, 3, day).unwrap();
        crate::views::Aggregator::aggregate(&CaseTable::from_records(vec![
            CaseRecord::new("1", 1)
                .with_date(d(1))
                .with_state("Kerala")
                .with_age(8.0)
                .with_gender("F")
                .with_transmission("Imported")
                .with_status("Recovered"),
            CaseRecord::new("2", 2)
                .with_date(d(2))
                .with_state("Delhi")
                .with_age(30.0)
                .with_gender("M"),
            CaseRecord::new("3", 3).with_date(d(3)).with_age(70.0),
        ]))
    }

    #[test]
    fn renders_every_view_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let populated = sample_views();
        let empty = crate::views::Aggregator::aggregate(&crate::data::CaseTable::default());

        for kind in ViewKind::ALL {
            for (tag, views) in [("full", &populated), ("empty", &empty)] {
                let path = dir.path().join(format!("{}_{tag}.png", kind.code()));
                StaticChartRenderer::render_png(kind, views.get(kind), &path, 800, 600).unwrap();
                assert!(std::fs::metadata(&path).unwrap().len() > 0);
            }
        }
    }

    #[test]
    fn axis_top_has_headroom() {
        assert_eq!(axis_top(0), 1.0);
        assert!(axis_top(100) > 100.0);
    }
}
