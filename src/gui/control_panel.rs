//! Control Panel Widget
//! Left side panel with data source, view selection and export controls.

use crate::views::ViewKind;
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// User selections
#[derive(Default, Clone)]
pub struct UserSettings {
    pub data_path: Option<PathBuf>,
    pub view: ViewKind,
}

/// Left side control panel with file selection and view dropdown.
pub struct ControlPanel {
    pub settings: UserSettings,
    pub record_count: usize,
    pub warning_count: usize,
    pub status: String,
    pub views_ready: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            settings: UserSettings::default(),
            record_count: 0,
            warning_count: 0,
            status: "Ready".to_string(),
            views_ready: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update dataset summary after a load completes
    pub fn set_summary(&mut self, record_count: usize, warning_count: usize) {
        self.record_count = record_count;
        self.warning_count = warning_count;
        self.views_ready = true;
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("Novel Corona virus in India")
                    .size(20.0)
                    .color(Color32::from_rgb(127, 219, 255)),
            );
            ui.label(
                RichText::new("Dashboard for analysing spread of corona in India")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .settings
                        .data_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.settings.data_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseData;
                        }
                    });
                });
            });

        if self.views_ready {
            ui.add_space(5.0);
            ui.label(
                RichText::new(format!(
                    "{} records, {} coerced values",
                    self.record_count, self.warning_count
                ))
                .size(11.0)
                .color(Color32::GRAY),
            );
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Visualization Section =====
        ui.label(RichText::new("📊 Visualization").size(14.0).strong());
        ui.add_space(5.0);
        ui.label("Please select a visualization from the below drop down:");
        ui.add_space(5.0);

        ComboBox::from_id_salt("view_select")
            .width(260.0)
            .selected_text(self.settings.view.label())
            .show_ui(ui, |ui| {
                for kind in ViewKind::ALL {
                    if ui
                        .selectable_label(self.settings.view == kind, kind.label())
                        .clicked()
                        && self.settings.view != kind
                    {
                        self.settings.view = kind;
                        action = ControlPanelAction::ViewChanged;
                    }
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.views_ready, |ui| {
                let json_button =
                    egui::Button::new(RichText::new("💾 Export Views (JSON)").size(14.0))
                        .min_size(egui::vec2(200.0, 30.0));
                if ui.add(json_button).clicked() {
                    action = ControlPanelAction::ExportJson;
                }

                ui.add_space(8.0);

                let png_button =
                    egui::Button::new(RichText::new("🖼 Export Chart (PNG)").size(14.0))
                        .min_size(egui::vec2(200.0, 30.0));
                if ui.add(png_button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Loaded") || self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseData,
    ViewChanged,
    ExportJson,
    ExportPng,
}
