//! Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::StaticChartRenderer;
use crate::config::DashboardConfig;
use crate::data::loader::WORKBOOK_EXTENSIONS;
use crate::data::DataLoader;
use crate::export;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::views::{Aggregator, DashboardViews};
use egui::SidePanel;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

const PNG_WIDTH: u32 = 1400;
const PNG_HEIGHT: u32 = 1000;

/// Result of a load + aggregation run on the background thread
enum LoadResult {
    Complete {
        views: DashboardViews,
        record_count: usize,
        warning_count: usize,
    },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    loader: Arc<DataLoader>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let loader = Arc::new(DataLoader::from_config(&config));
        let mut app = Self {
            config,
            loader,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
        };

        if let Some(path) = app.config.data_path.clone() {
            app.start_load(path);
        }
        app
    }

    /// Handle line-list file selection
    fn handle_browse_data(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Line list", &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv"])
            .add_filter("Excel Workbook", &WORKBOOK_EXTENSIONS)
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_load(path);
        }
    }

    /// Load and aggregate in a background thread
    fn start_load(&mut self, path: PathBuf) {
        self.chart_viewer.clear();
        self.control_panel.views_ready = false;
        self.control_panel.settings.data_path = Some(path.clone());
        self.control_panel.set_status("Loading case table...");
        self.is_loading = true;

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        let loader = Arc::clone(&self.loader);

        thread::spawn(move || {
            let result = match loader.load(&path) {
                Ok(table) => LoadResult::Complete {
                    views: Aggregator::aggregate(&table),
                    record_count: table.len(),
                    warning_count: table.warnings().len(),
                },
                Err(e) => {
                    tracing::error!("load of {} failed: {}", path.display(), e);
                    LoadResult::Error(e.to_string())
                }
            };
            let _ = tx.send(result);
        });
    }

    /// Check for load results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete {
                views,
                record_count,
                warning_count,
            }) => {
                self.chart_viewer.set_views(views);
                self.control_panel.set_summary(record_count, warning_count);
                self.control_panel
                    .set_status(&format!("Loaded {} records", record_count));
                self.is_loading = false;
            }
            Ok(LoadResult::Error(error)) => {
                self.control_panel.set_status(&format!("Error: {}", error));
                self.is_loading = false;
            }
            Err(TryRecvError::Empty) => {
                self.load_rx = Some(rx);
            }
            Err(TryRecvError::Disconnected) => {
                self.control_panel.set_status("Error: loader thread exited");
                self.is_loading = false;
            }
        }
    }

    /// Handle JSON export of every view
    fn handle_export_json(&mut self) {
        let Some(views) = &self.chart_viewer.views else {
            self.control_panel.set_status("No views to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_directory(&self.config.export_dir)
            .set_file_name(export::VIEWS_FILE_NAME)
            .save_file()
        else {
            return;
        };

        match export::write_json(views, &path) {
            Ok(()) => self
                .control_panel
                .set_status(&format!("Exported views to {}", path.display())),
            Err(e) => {
                tracing::warn!("view export failed: {:#}", e);
                self.control_panel.set_status(&format!("Error: {:#}", e));
            }
        }
    }

    /// Handle PNG export of the selected view
    fn handle_export_png(&mut self) {
        let kind = self.control_panel.settings.view;
        let Some(views) = &self.chart_viewer.views else {
            self.control_panel.set_status("No chart to export");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_directory(&self.config.export_dir)
            .set_file_name(format!("{}.png", kind.code().to_lowercase()))
            .save_file()
        else {
            return;
        };

        let rendered =
            StaticChartRenderer::render_png(kind, views.get(kind), &path, PNG_WIDTH, PNG_HEIGHT);
        match rendered {
            Ok(()) => self
                .control_panel
                .set_status(&format!("Exported chart to {}", path.display())),
            Err(e) => {
                tracing::warn!("chart export failed: {}", e);
                self.control_panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseData => self.handle_browse_data(),
                        ControlPanelAction::ViewChanged => {
                            tracing::debug!(
                                "view switched to {}",
                                self.control_panel.settings.view.code()
                            );
                        }
                        ControlPanelAction::ExportJson => self.handle_export_json(),
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            let kind = self.control_panel.settings.view;
            self.chart_viewer.show(ui, kind);
        });
    }
}
