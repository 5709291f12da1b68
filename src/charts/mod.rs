//! Charts module - Chart rendering

mod color;
mod plotter;
mod renderer;

pub use color::{bar_colors, color_for, secondary_range, BAR_COLOR};
pub use plotter::ChartPlotter;
pub use renderer::{render_bar_chart_png, save_bar_chart_png, RenderError};
