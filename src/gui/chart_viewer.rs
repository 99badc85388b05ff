//! Chart Viewer Widget
//! Central panel showing the chart of the selected view.

use crate::charts::{ChartPlotter, DateWindow};
use crate::views::{DashboardViews, ViewKind};
use egui::{RichText, ScrollArea};

/// Holds the current result set and the time series range selection.
#[derive(Default)]
pub struct ChartViewer {
    pub views: Option<DashboardViews>,
    pub window: DateWindow,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all charts
    pub fn clear(&mut self) {
        self.views = None;
        self.window = DateWindow::default();
    }

    /// Replace the whole result set.
    pub fn set_views(&mut self, views: DashboardViews) {
        let days = views
            .get(ViewKind::DailyCases)
            .as_category()
            .map(|v| v.labels.len())
            .unwrap_or(0);
        self.window = DateWindow::full(days);
        self.views = Some(views);
    }

    /// Draw the selected view
    pub fn show(&mut self, ui: &mut egui::Ui, kind: ViewKind) {
        let Some(views) = &self.views else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Frame::none()
                    .rounding(8.0)
                    .fill(ui.visuals().extreme_bg_color)
                    .inner_margin(16.0)
                    .show(ui, |ui| {
                        ChartPlotter::draw_view(ui, kind, views.get(kind), &mut self.window);
                    });
            });
    }
}
