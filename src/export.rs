//! View Export Module
//! Writes the computed views as a JSON document keyed by view code.

use crate::views::DashboardViews;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// File name used when exporting into a directory.
pub const VIEWS_FILE_NAME: &str = "covid_views.json";

pub fn to_json_string(views: &DashboardViews) -> Result<String> {
    serde_json::to_string_pretty(views).context("Failed to serialize views")
}

pub fn write_json(views: &DashboardViews, path: &Path) -> Result<()> {
    let json = to_json_string(views)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("exported views to {}", path.display());
    Ok(())
}
