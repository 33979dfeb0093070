//! PNG charts of a forecast run, drawn with plotters.

pub mod fonts;
pub mod layout;
pub mod renderer;

pub use renderer::{ChartFiles, PlottersChartRenderer};
