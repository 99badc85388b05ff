//! COVID Insight - line-list aggregation & interactive dashboard
//!
//! Loads a COVID-19 case line-list, normalizes missing and malformed values,
//! and derives six chart-ready views selectable from a single dropdown.

pub mod charts;
pub mod config;
pub mod data;
pub mod export;
pub mod gui;
pub mod views;

pub use config::DashboardConfig;
pub use data::{CaseRecord, CaseTable, DataLoader, LoadError};
pub use views::{Aggregator, AggregateView, DashboardViews, ViewKind};
