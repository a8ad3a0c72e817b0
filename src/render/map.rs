//! Choropleth maps of a geo table.

use std::path::{Path, PathBuf};

use duckdb::arrow::{array::Array, util::display::array_value_to_string};
use geo::{BoundingRect, Geometry};
use log::info;
use plotters::prelude::*;
use tabled::{builder::Builder, settings::Style};

use super::{render_err, scale::DivergingScale};
use crate::{
    error::{RainfallError, Result},
    geometry::GeoTable,
    query::f64_column,
};

const WIDTH: u32 = 900;
const HEIGHT: u32 = 700;
const LEGEND_WIDTH: u32 = 130;

pub const LEGEND_CAPTION: &str = "3-monthly Rainfall Anomaly (% of normal)";

#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    pub value: Option<f64>,
    pub fill: RGBColor,
    /// `(column, value)` pairs shown for the feature
    pub tooltip: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct MapArtifact {
    pub path: PathBuf,
    pub features: Vec<MapFeature>,
}

impl MapArtifact {
    /// Tooltip values and fill of every feature, one row each.
    pub fn tooltip_table(&self) -> String {
        let mut builder = Builder::default();
        if let Some(first) = self.features.first() {
            let mut header: Vec<String> = first.tooltip.iter().map(|(c, _)| c.clone()).collect();
            header.push("fill".to_string());
            builder.push_record(header);
        }
        for feature in &self.features {
            let mut record: Vec<String> = feature.tooltip.iter().map(|(_, v)| v.clone()).collect();
            let RGBColor(r, g, b) = feature.fill;
            record.push(format!("#{r:02x}{g:02x}{b:02x}"));
            builder.push_record(record);
        }

        builder.build().with(Style::rounded()).to_string()
    }
}

/// Colours and tooltips of every feature of `table`.
pub fn map_features(
    table: &GeoTable,
    value_column: &str,
    scale: &DivergingScale,
    tooltip_columns: &[&str],
) -> Result<Vec<MapFeature>> {
    let mut features = Vec::with_capacity(table.len());

    for batch in &table.batches {
        let values = f64_column(batch, value_column)?;
        let tooltip_arrays = tooltip_columns
            .iter()
            .map(|name| {
                batch
                    .column_by_name(name)
                    .map(|array| (name.to_string(), array))
                    .ok_or_else(|| RainfallError::Parse(format!("tooltip column `{name}`")))
            })
            .collect::<Result<Vec<_>>>()?;

        for row in 0..batch.num_rows() {
            let value = (!values.is_null(row)).then(|| values.value(row));
            let tooltip = tooltip_arrays
                .iter()
                .map(|(name, array)| {
                    array_value_to_string(*array, row)
                        .map(|v| (name.clone(), v))
                        .map_err(|e| RainfallError::Parse(e.to_string()))
                })
                .collect::<Result<Vec<_>>>()?;

            features.push(MapFeature {
                value,
                fill: scale.color(value),
                tooltip,
            });
        }
    }

    Ok(features)
}

/// Draws `table` coloured by `value_column` and writes it as SVG to `path`.
pub fn render_map(
    table: &GeoTable,
    value_column: &str,
    scale: &DivergingScale,
    tooltip_columns: &[&str],
    title: &str,
    path: &Path,
) -> Result<MapArtifact> {
    let features = map_features(table, value_column, scale, tooltip_columns)?;
    let bounds = table
        .bounds()
        .ok_or_else(|| RainfallError::Render("no features to draw".to_string()))?;

    let pad = 0.03 * bounds.width().max(bounds.height()).max(f64::EPSILON);
    let x_range = (bounds.min().x - pad)..(bounds.max().x + pad);
    let y_range = (bounds.min().y - pad)..(bounds.max().y + pad);

    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let (map_area, legend_area) = root.split_horizontally(WIDTH - LEGEND_WIDTH);

    let mut chart = ChartBuilder::on(&map_area)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_err)?;

    let order = draw_order(table);

    // Holes are cleared as each unit is filled; units inside a hole are
    // smaller than their container and come later in the order.
    for &i in &order {
        for polygon in polygons(&table.geometries[i]) {
            chart
                .draw_series(std::iter::once(Polygon::new(
                    ring(polygon.exterior()),
                    features[i].fill.filled(),
                )))
                .map_err(render_err)?;
            chart
                .draw_series(
                    polygon
                        .interiors()
                        .iter()
                        .map(|hole| Polygon::new(ring(hole), WHITE.filled())),
                )
                .map_err(render_err)?;
        }
    }
    for geometry in &table.geometries {
        for polygon in polygons(geometry) {
            chart
                .draw_series(
                    std::iter::once(polygon.exterior())
                        .chain(polygon.interiors())
                        .map(|line| PathElement::new(ring(line), BLACK.mix(0.6).stroke_width(1))),
                )
                .map_err(render_err)?;
        }
    }

    draw_legend(&legend_area, scale)?;
    root.present().map_err(render_err)?;
    info!("Map written to `{}`", path.display());

    Ok(MapArtifact {
        path: path.to_path_buf(),
        features,
    })
}

/// Feature indices by decreasing extent.
fn draw_order(table: &GeoTable) -> Vec<usize> {
    let area = |g: &Geometry<f64>| g.bounding_rect().map(|r| r.width() * r.height()).unwrap_or(0.0);
    let mut order: Vec<usize> = (0..table.len()).collect();
    order.sort_by(|&a, &b| area(&table.geometries[b]).total_cmp(&area(&table.geometries[a])));

    order
}

fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    scale: &DivergingScale,
) -> Result<()> {
    let mut legend = ChartBuilder::on(area)
        .margin_top(60)
        .margin_bottom(60)
        .margin_right(10)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..1.0, scale.min..scale.max)
        .map_err(render_err)?;

    legend
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_desc(LEGEND_CAPTION)
        .draw()
        .map_err(render_err)?;

    let steps = 100;
    let step = (scale.max - scale.min) / steps as f64;
    legend
        .draw_series((0..steps).map(|i| {
            let lo = scale.min + i as f64 * step;
            let color = scale.color(Some(lo + step / 2.0));
            Rectangle::new([(0.0, lo), (1.0, lo + step)], color.filled())
        }))
        .map_err(render_err)?;

    Ok(())
}

fn polygons(geometry: &Geometry<f64>) -> Vec<&geo::Polygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => vec![p],
        Geometry::MultiPolygon(m) => m.0.iter().collect(),
        Geometry::GeometryCollection(c) => c.0.iter().flat_map(polygons).collect(),
        _ => vec![],
    }
}

fn ring(line: &geo::LineString<f64>) -> Vec<(f64, f64)> {
    line.coords().map(|c| (c.x, c.y)).collect()
}

// -- Tests -------------------------------------------------------------------
