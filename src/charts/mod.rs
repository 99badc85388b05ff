//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, DateWindow};
pub use renderer::{RenderError, StaticChartRenderer};
