//! Bar charts of observed against long-term average rainfall.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;
use plotters::prelude::*;

use super::render_err;
use crate::{
    error::{RainfallError, Result},
    query::SeriesPoint,
};

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 400;

const AVERAGE_COLOR: RGBColor = RGBColor(0x93, 0xf1, 0xdf);
const OBSERVED_COLOR: RGBColor = RGBColor(0x22, 0x55, 0x85);

#[derive(Debug, Clone)]
pub struct ChartArtifact {
    pub path: PathBuf,
    pub dates: Vec<NaiveDate>,
}

/// Sorted unique dates of a series.
pub fn date_axis(series: &[SeriesPoint]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = series.iter().map(|p| p.date).collect();
    dates.sort();
    dates.dedup();

    dates
}

/// Points whose date lies between axis positions `lo` and `hi`, both included.
pub fn zoom(series: &[SeriesPoint], range: [usize; 2]) -> Result<Vec<SeriesPoint>> {
    let axis = date_axis(series);
    let [lo, hi] = range;
    if lo > hi || hi >= axis.len() {
        return Err(RainfallError::InvalidRange {
            lo,
            hi,
            start: 0,
            stop: axis.len().saturating_sub(1),
        });
    }

    let (first, last) = (axis[lo], axis[hi]);
    Ok(series
        .iter()
        .filter(|p| first <= p.date && p.date <= last)
        .cloned()
        .collect())
}

/// `"<first date> to <last date>"` of a zoom window.
pub fn window_label(series: &[SeriesPoint], range: [usize; 2]) -> Result<String> {
    let window = date_axis(&zoom(series, range)?);
    match (window.first(), window.last()) {
        (Some(first), Some(last)) => Ok(format!("{} to {}", first, last)),
        _ => Err(RainfallError::Render("empty window".to_string())),
    }
}

/// Draws the long-term average bars behind the observed ones.
pub fn render_bars(series: &[SeriesPoint], title: &str, path: &Path) -> Result<ChartArtifact> {
    let axis = date_axis(series);
    if axis.is_empty() {
        return Err(RainfallError::Render(format!("no data for `{}`", title)));
    }

    let y_max = series
        .iter()
        .flat_map(|p| [p.rfh, p.rfh_avg])
        .flatten()
        .fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..(axis.len() as f64 - 0.5), 0.0..y_max)
        .map_err(render_err)?;

    let label = |x: &f64| {
        let idx = x.round();
        if idx < 0.0 {
            return String::new();
        }
        axis.get(idx as usize)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(8)
        .x_label_formatter(&label)
        .x_desc("Date")
        .y_desc("Rainfall [mm]")
        .draw()
        .map_err(render_err)?;

    let position = |date: NaiveDate| axis.binary_search(&date).unwrap_or_default() as f64;
    let bar = |date: NaiveDate, value: f64, style: ShapeStyle| {
        let x = position(date);
        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, value)], style)
    };

    chart
        .draw_series(
            series
                .iter()
                .filter_map(|p| p.rfh_avg.map(|v| bar(p.date, v, AVERAGE_COLOR.mix(0.7).filled()))),
        )
        .map_err(render_err)?;
    chart
        .draw_series(
            series
                .iter()
                .filter_map(|p| p.rfh.map(|v| bar(p.date, v, OBSERVED_COLOR.filled()))),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    info!("Chart written to `{}`", path.display());

    Ok(ChartArtifact {
        path: path.to_path_buf(),
        dates: axis,
    })
}

// -- Tests -------------------------------------------------------------------
