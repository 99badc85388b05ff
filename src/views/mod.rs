//! Views module - aggregate computation and chart-ready shapes

pub mod aggregator;
pub mod model;

pub use aggregator::{Aggregator, AGE_BINS, TRANSMISSION_LABELS};
pub use model::{
    AggregateView, CategoryView, DashboardViews, NamedSeries, PointSeries, ScatterView,
    UnknownViewCode, ViewKind,
};
