//! Renders maps and charts as SVG files.

pub mod bars;
pub mod map;
pub mod scale;

pub use bars::{render_bars, window_label, zoom, ChartArtifact};
pub use map::{render_map, MapArtifact};
pub use scale::DivergingScale;

use crate::error::RainfallError;

fn render_err<E: std::fmt::Display>(e: E) -> RainfallError {
    RainfallError::Render(e.to_string())
}
