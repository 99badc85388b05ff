//! COVID Insight - dashboard for analysing the spread of COVID-19 in India
//!
//! Loads the case line-list and displays one aggregate chart at a time.

use anyhow::{anyhow, Context, Result};
use covid_insight::gui::DashboardApp;
use covid_insight::DashboardConfig;
use eframe::egui;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = DashboardConfig::discover().context("Failed to load configuration")?;
    tracing::info!("startup");

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("Novel Corona virus in India"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "COVID Insight",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("Dashboard exited with error: {e}"))
}
