//! Turns query results with a WKT column into typed geometries.

use duckdb::arrow::{array::Array, record_batch::RecordBatch};
use geo::{BoundingRect, Geometry, Rect};
use wkt::{ToWkt, TryFromWkt};

use crate::{
    error::{RainfallError, Result},
    query::string_column,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Coordinate reference system, identified by its EPSG code.
pub struct Crs(pub u32);

impl Crs {
    pub const WGS84: Crs = Crs(4326);
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

/// Attribute rows paired with one parsed geometry per row.
#[derive(Debug, Clone)]
pub struct GeoTable {
    pub batches: Vec<RecordBatch>,
    pub geometry_column: String,
    pub crs: Crs,
    pub geometries: Vec<Geometry<f64>>,
}

/// Parses the `geometry_column` of every row and designates it as the
/// active geometry.
pub fn to_geo(batches: Vec<RecordBatch>, geometry_column: &str, crs: Crs) -> Result<GeoTable> {
    let mut geometries = Vec::new();
    let mut row = 0;

    for batch in &batches {
        let column = string_column(batch, geometry_column)?;
        for i in 0..batch.num_rows() {
            if column.is_null(i) {
                return Err(RainfallError::InvalidGeometry {
                    row,
                    reason: "missing geometry".to_string(),
                });
            }
            let geometry = Geometry::<f64>::try_from_wkt_str(column.value(i)).map_err(|e| {
                RainfallError::InvalidGeometry {
                    row,
                    reason: e.to_string(),
                }
            })?;
            geometries.push(geometry);
            row += 1;
        }
    }

    Ok(GeoTable {
        batches,
        geometry_column: geometry_column.to_string(),
        crs,
        geometries,
    })
}

impl GeoTable {
    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Geometries written back as well-known text.
    pub fn to_wkt(&self) -> Vec<String> {
        self.geometries.iter().map(|g| g.wkt_string()).collect()
    }

    /// Extent of all geometries, if any has coordinates.
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.geometries
            .iter()
            .filter_map(|g| g.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                    (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
                )
            })
    }
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use duckdb::arrow::{
        array::{ArrayRef, StringArray},
        datatypes::{DataType, Field, Schema},
    };
    use geo::{CoordsIter, MultiPolygon};

    use super::*;
    use crate::query::{fixtures, joined_view, AdminLevel};

    fn batch(wkts: Vec<Option<&str>>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "geometry",
            DataType::Utf8,
            true,
        )]));
        let column: ArrayRef = Arc::new(StringArray::from(wkts));
        RecordBatch::try_new(schema, vec![column]).unwrap()
    }

    fn coords(g: &Geometry<f64>) -> Vec<(f64, f64)> {
        g.coords_iter().map(|c| (c.x, c.y)).collect()
    }

    #[test]
    fn should_parse_polygons_and_multipolygons() {
        let table = to_geo(
            vec![batch(vec![
                Some("POLYGON ((43.1 13.2, 43.9 13.2, 43.9 14.0, 43.1 13.2))"),
                Some("MULTIPOLYGON (((42.5 15.1, 42.9 15.1, 42.9 15.6, 42.5 15.1)), ((42.0 14.0, 42.2 14.0, 42.2 14.3, 42.0 14.0)))"),
            ])],
            "geometry",
            Crs::WGS84,
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.crs.to_string(), "EPSG:4326");
        assert!(matches!(table.geometries[0], Geometry::Polygon(_)));
        let multi: MultiPolygon<f64> = table.geometries[1].clone().try_into().unwrap();
        assert_eq!(multi.0.len(), 2);
    }

    #[test]
    fn should_round_trip_through_wkt() {
        let table = to_geo(
            vec![batch(vec![Some(
                "POLYGON ((43.123456789 13.2, 43.9 13.25, 43.9 14.0, 43.123456789 13.2), (43.5 13.5, 43.6 13.5, 43.6 13.6, 43.5 13.5))",
            )])],
            "geometry",
            Crs::WGS84,
        )
        .unwrap();

        let again = to_geo(vec![batch(vec![Some(table.to_wkt()[0].as_str())])], "geometry", Crs::WGS84)
            .unwrap();

        let before = coords(&table.geometries[0]);
        let after = coords(&again.geometries[0]);
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9);
        }
    }

    #[test]
    fn should_reject_malformed_wkt() {
        let result = to_geo(
            vec![batch(vec![
                Some("POLYGON ((0 0, 1 0, 1 1, 0 0))"),
                Some("POLYGON ((0 0, 1 0"),
            ])],
            "geometry",
            Crs::WGS84,
        );

        assert!(matches!(result, Err(RainfallError::InvalidGeometry { row: 1, .. })));
    }

    #[test]
    fn should_reject_missing_geometry() {
        let result = to_geo(vec![batch(vec![None])], "geometry", Crs::WGS84);
        assert!(matches!(result, Err(RainfallError::InvalidGeometry { row: 0, .. })));
    }

    #[test]
    fn should_convert_joined_view() {
        let session = fixtures::session();
        let batches = joined_view(
            &session,
            AdminLevel::One,
            chrono::NaiveDate::from_ymd_opt(2025, 7, 11).unwrap(),
            None,
        )
        .unwrap();
        let table = to_geo(batches, "geometry", Crs::WGS84).unwrap();

        assert_eq!(table.len(), 22);
        let bounds = table.bounds().unwrap();
        assert_eq!(bounds.min().x, 0.0);
        assert_eq!(bounds.max().x, 22.0);
        assert_eq!(bounds.max().y, 13.0);
    }
}
