//! Chart Plotter Module
//! Draws each dashboard view interactively using egui_plot and the egui painter.

use crate::views::{AggregateView, CategoryView, ScatterView, ViewKind};
use chrono::{Datelike, NaiveDate};
use egui::{Align2, Color32, FontId, RichText, Sense, Stroke};
use egui_plot::{Bar, BarChart, Legend, Line, MarkerShape, Plot, PlotPoints, Points};
use std::f32::consts::TAU;

/// Color palette for series and slices
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(121, 85, 72),   // Brown
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

const CHART_HEIGHT: f32 = 480.0;
const PIE_SIZE: f32 = 420.0;
const DONUT_HOLE: f32 = 0.3;

pub fn series_color(index: usize) -> Color32 {
    PALETTE[index % PALETTE.len()]
}

/// Index window of the time series, driven by the range selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: usize,
    pub end: usize,
}

impl DateWindow {
    /// Whole series.
    pub fn full(len: usize) -> Self {
        Self {
            start: 0,
            end: len.saturating_sub(1),
        }
    }

    /// Keep the window inside `0..len` and ordered.
    pub fn clamp(&mut self, len: usize) {
        let last = len.saturating_sub(1);
        self.end = self.end.min(last);
        self.start = self.start.min(self.end);
    }
}

/// Day number used as the x coordinate of date axes.
pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub fn x_to_date_label(x: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
        .map(|d| d.format("%d %b").to_string())
        .unwrap_or_default()
}

/// Percent share of each value, rounded to one decimal.
pub fn shares(values: &[u64]) -> Vec<f64> {
    let total: u64 = values.iter().sum();
    if total == 0 {
        return vec![0.0; values.len()];
    }
    values
        .iter()
        .map(|&v| (v as f64 * 1000.0 / total as f64).round() / 10.0)
        .collect()
}

/// Draws interactive charts for the dashboard views.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw the chart for one view, or a placeholder when it is empty.
    pub fn draw_view(
        ui: &mut egui::Ui,
        kind: ViewKind,
        view: &AggregateView,
        window: &mut DateWindow,
    ) {
        ui.label(RichText::new(kind.title()).size(18.0).strong());
        ui.add_space(8.0);

        if view.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        match (kind, view) {
            (ViewKind::Transmission, AggregateView::Category(v)) => Self::draw_grouped_bars(ui, v),
            (ViewKind::DailyCases, AggregateView::Category(v)) => {
                Self::draw_time_series(ui, v, window)
            }
            (ViewKind::StateWise, AggregateView::Category(v)) => {
                Self::draw_pie(ui, kind, v, DONUT_HOLE, false)
            }
            (ViewKind::AgeWise, AggregateView::Category(v)) => Self::draw_funnel(ui, v),
            (ViewKind::PatientStatus, AggregateView::Category(v)) => {
                Self::draw_pie(ui, kind, v, 0.0, true)
            }
            (_, AggregateView::Scatter(v)) => Self::draw_scatter(ui, v),
            (_, AggregateView::Category(v)) => Self::draw_grouped_bars(ui, v),
        }
    }

    /// One bar group per label, one bar per series.
    pub fn draw_grouped_bars(ui: &mut egui::Ui, view: &CategoryView) {
        let labels = view.labels.clone();
        let n_series = view.series.len().max(1);
        let bar_width = 0.8 / n_series as f64;

        Plot::new("grouped_bars")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .y_axis_label("Cases")
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < labels.len() {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (si, series) in view.series.iter().enumerate() {
                    let offset = (si as f64 - (n_series as f64 - 1.0) / 2.0) * bar_width;
                    let bars: Vec<Bar> = series
                        .values
                        .iter()
                        .enumerate()
                        .map(|(li, &v)| {
                            Bar::new(li as f64 + offset, v as f64)
                                .width(bar_width)
                                .name(&series.name)
                        })
                        .collect();
                    plot_ui.bar_chart(
                        BarChart::new(bars)
                            .name(&series.name)
                            .color(series_color(si)),
                    );
                }
            });
    }

    /// Line over dates with a from/to range selector below the plot.
    pub fn draw_time_series(ui: &mut egui::Ui, view: &CategoryView, window: &mut DateWindow) {
        let Some(series) = view.series.first() else {
            return;
        };
        let points: Vec<(NaiveDate, u64)> = view
            .labels
            .iter()
            .zip(series.values.iter())
            .filter_map(|(label, &v)| {
                NaiveDate::parse_from_str(label, "%Y-%m-%d")
                    .ok()
                    .map(|d| (d, v))
            })
            .collect();
        if points.is_empty() {
            return;
        }
        window.clamp(points.len());

        let visible: PlotPoints = points[window.start..=window.end]
            .iter()
            .map(|(d, v)| [date_to_x(*d), *v as f64])
            .collect();

        Plot::new("time_series")
            .height(CHART_HEIGHT - 60.0)
            .allow_scroll(false)
            .x_axis_label("Date")
            .y_axis_label("No of cases")
            .x_axis_formatter(|mark, _range| x_to_date_label(mark.value))
            .label_formatter(|_name, value| {
                format!("{}: {:.0}", x_to_date_label(value.x), value.y)
            })
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(visible)
                        .color(series_color(0))
                        .width(2.0)
                        .name(&series.name),
                );
            });

        ui.add_space(6.0);
        let last = points.len() - 1;
        ui.horizontal(|ui| {
            ui.label("Range:");
            ui.add(egui::Slider::new(&mut window.start, 0..=last).show_value(false));
            ui.add(egui::Slider::new(&mut window.end, 0..=last).show_value(false));
            if ui.small_button("Reset").clicked() {
                *window = DateWindow::full(points.len());
            }
        });
        window.clamp(points.len());
        ui.label(
            RichText::new(format!(
                "{} to {}",
                points[window.start].0.format("%d/%m/%Y"),
                points[window.end].0.format("%d/%m/%Y")
            ))
            .size(12.0)
            .color(Color32::GRAY),
        );
    }

    /// Pie (or donut when `hole > 0`) with a legend alongside.
    pub fn draw_pie(
        ui: &mut egui::Ui,
        kind: ViewKind,
        view: &CategoryView,
        hole: f32,
        slice_text: bool,
    ) {
        let pairs = view.pairs();
        let values: Vec<u64> = pairs.iter().map(|(_, v)| *v).collect();
        let pct = shares(&values);
        let total: u64 = values.iter().sum();
        if total == 0 {
            return;
        }

        ui.horizontal(|ui| {
            let (response, painter) =
                ui.allocate_painter(egui::vec2(PIE_SIZE, PIE_SIZE), Sense::hover());
            let center = response.rect.center();
            let radius = PIE_SIZE * 0.45;

            let mut start = -TAU / 4.0;
            let mut hovered: Option<usize> = None;
            let pointer = response.hover_pos().map(|p| p - center);

            for (i, &v) in values.iter().enumerate() {
                let sweep = TAU * v as f32 / total as f32;
                let color = series_color(i);
                Self::paint_slice(&painter, center, radius, start, sweep, color);

                if let Some(p) = pointer {
                    let dist = p.length();
                    let mut angle = p.y.atan2(p.x);
                    while angle < start {
                        angle += TAU;
                    }
                    if dist <= radius && dist >= radius * hole && angle < start + sweep {
                        hovered = Some(i);
                    }
                }

                if slice_text && pct[i] >= 3.0 {
                    let mid = start + sweep / 2.0;
                    let r = radius * (0.5 + hole / 2.0).max(0.6);
                    let pos = center + egui::vec2(mid.cos(), mid.sin()) * r;
                    painter.text(
                        pos,
                        Align2::CENTER_CENTER,
                        format!("{:.1}%", pct[i]),
                        FontId::proportional(13.0),
                        Color32::WHITE,
                    );
                }
                start += sweep;
            }

            if hole > 0.0 {
                painter.circle_filled(center, radius * hole, ui.visuals().panel_fill);
            }

            if let Some(i) = hovered {
                let (label, v) = pairs[i];
                response.on_hover_text(format!("{label}: {v} ({:.1}%)", pct[i]));
            }

            ui.add_space(20.0);
            egui::ScrollArea::vertical()
                .id_salt(format!("legend_{}", kind.code()))
                .max_height(PIE_SIZE)
                .show(ui, |ui| {
                    for (i, (label, v)) in pairs.iter().enumerate() {
                        ui.horizontal(|ui| {
                            let (rect, _) =
                                ui.allocate_exact_size(egui::vec2(14.0, 14.0), Sense::hover());
                            ui.painter().rect_filled(rect, 3.0, series_color(i));
                            ui.label(RichText::new(format!("{label} ({v})")).size(13.0));
                        });
                    }
                });
        });
    }

    /// Fill one slice as a fan of thin triangles.
    fn paint_slice(
        painter: &egui::Painter,
        center: egui::Pos2,
        radius: f32,
        start: f32,
        sweep: f32,
        color: Color32,
    ) {
        let steps = ((sweep / TAU) * 120.0).ceil().max(1.0) as usize;
        let step = sweep / steps as f32;
        for s in 0..steps {
            let a0 = start + step * s as f32;
            let a1 = a0 + step;
            let p0 = center + egui::vec2(a0.cos(), a0.sin()) * radius;
            let p1 = center + egui::vec2(a1.cos(), a1.sin()) * radius;
            painter.add(egui::Shape::convex_polygon(
                vec![center, p0, p1],
                color,
                Stroke::new(0.5, color),
            ));
        }
        let edge = center + egui::vec2(start.cos(), start.sin()) * radius;
        painter.line_segment([center, edge], Stroke::new(1.0, Color32::WHITE));
    }

    /// Centered horizontal bars, first category on top.
    pub fn draw_funnel(ui: &mut egui::Ui, view: &CategoryView) {
        let pairs = view.pairs();
        let labels: Vec<String> = pairs.iter().map(|(l, _)| l.to_string()).collect();
        let n = pairs.len();

        Plot::new("funnel")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .show_grid(false)
            .show_x(false)
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 && (idx as usize) < n {
                    labels[n - 1 - idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (i, (label, v)) in pairs.iter().enumerate() {
                    let v = *v as f64;
                    let bar = Bar::new((n - 1 - i) as f64, v)
                        .base_offset(-v / 2.0)
                        .width(0.9)
                        .name(label);
                    plot_ui.bar_chart(
                        BarChart::new(vec![bar])
                            .horizontal()
                            .name(format!("{label} ({})", v as u64))
                            .color(series_color(i)),
                    );
                }
            });
    }

    /// One marker per record, one named series per state.
    pub fn draw_scatter(ui: &mut egui::Ui, view: &ScatterView) {
        Plot::new("state_emergence")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Date")
            .y_axis_label("Case No")
            .x_axis_formatter(|mark, _range| x_to_date_label(mark.value))
            .label_formatter(|name, value| {
                format!("{name}\n{}: case {:.0}", x_to_date_label(value.x), value.y)
            })
            .show(ui, |plot_ui| {
                for (i, series) in view.series.iter().enumerate() {
                    let points: PlotPoints = series
                        .points
                        .iter()
                        .map(|(d, ordinal)| [date_to_x(*d), *ordinal as f64])
                        .collect();
                    plot_ui.points(
                        Points::new(points)
                            .shape(MarkerShape::Circle)
                            .radius(5.0)
                            .filled(true)
                            .color(series_color(i).gamma_multiply(0.7))
                            .name(&series.name),
                    );
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_sum_to_hundred() {
        let pct = shares(&[1, 1, 2]);
        assert_eq!(pct, vec![25.0, 25.0, 50.0]);
        assert_eq!(shares(&[0, 0]), vec![0.0, 0.0]);
    }

    #[test]
    fn date_window_clamps_into_range() {
        let mut w = DateWindow { start: 8, end: 20 };
        w.clamp(5);
        assert_eq!(w, DateWindow { start: 4, end: 4 });
        assert_eq!(DateWindow::full(0), DateWindow { start: 0, end: 0 });
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
            CaseRecord::new("2", 2).with_date(d(2)).with_age(30.0),
            CaseRecord::new("3", 3).with_date(d(3)).with_age(70.0),
        ]))
    }

    #[test]
    fn every_view_draws_headless() {
        let views = sample_views();
        let ctx = egui::Context::default();
        for kind in ViewKind::ALL {
            let mut window = DateWindow::full(2);
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ChartPlotter::draw_view(ui, kind, views.get(kind), &mut window);
                });
            });
        }
    }

    #[test]
    fn age_funnel_draws_headless() {
        let views = sample_views();
        let view = views.get(ViewKind::AgeWise).as_category().unwrap();
        assert_eq!(view.total(), 3);
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| ChartPlotter::draw_funnel(ui, view));
        });
    }

    #[test]
    fn date_axis_round_trips() {
        let d = NaiveDate::from_ymd_opt(2020, 3, 14).unwrap();
        assert_eq!(x_to_date_label(date_to_x(d)), "14 Mar");
    }
}
