//! Loads remote sources straight into session tables.
//!
//! Boundary archives are read through GDAL's virtual file systems:
//! `/vsizip/` treats the target as a zip archive and `/vsicurl/` fetches it
//! over HTTP with range requests, so only the bytes of the requested layer are
//! transferred.

use log::info;

use crate::{
    engine::{quote_ident, quote_literal, Session},
    error::{RainfallError, Result},
    resource::ResourceDescriptor,
};

const VSI_ZIP: &str = "/vsizip/";
const VSI_CURL: &str = "/vsicurl/";

/// Creates (or replaces) `table` with the contents of the CSV at `source`.
pub fn load_csv(session: &Session, table: &str, source: &str) -> Result<usize> {
    let sql = format!(
        "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_csv({});",
        quote_ident(table),
        quote_literal(source)
    );
    session.execute(&sql).map_err(classify_fetch_error)?;

    let rows = session.row_count(table)?;
    info!("Loaded {} rows into `{}`", rows, table);

    Ok(rows)
}

/// Path under which GDAL reads the geopackage inside a remote zip archive.
///
/// The geopackage is expected to carry the archive's name with its `zip`
/// extension swapped for `gpkg`.
pub fn vsi_path(archive: &ResourceDescriptor) -> String {
    format!(
        "{}{}{}/{}",
        VSI_ZIP,
        VSI_CURL,
        archive.url,
        geopackage_name(&archive.name)
    )
}

fn geopackage_name(archive_name: &str) -> String {
    match archive_name.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("zip") => {
            let ext = if ext == "ZIP" { "GPKG" } else { "gpkg" };
            format!("{stem}.{ext}")
        }
        _ => format!("{archive_name}.gpkg"),
    }
}

/// Names of the layers contained in the dataset at `path`.
pub fn list_layers(session: &Session, path: &str) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT l.name FROM (SELECT unnest(layers) AS l FROM st_read_meta({}))",
        quote_literal(path)
    );
    session.query_strings(&sql, &[]).map_err(classify_fetch_error)
}

/// Creates (or replaces) `table` from one layer of a zipped geopackage.
///
/// The geometry column is stored as well-known text in a column named
/// `geometry`; the remaining attribute columns are kept as they are.
pub fn load_geo_layer(
    session: &Session,
    table: &str,
    archive: &ResourceDescriptor,
    layer: &str,
    geometry_column: &str,
) -> Result<usize> {
    load_layer_at(session, table, &vsi_path(archive), layer, geometry_column)
}

/// Same as [`load_geo_layer`] for any path GDAL can open.
pub fn load_layer_at(
    session: &Session,
    table: &str,
    path: &str,
    layer: &str,
    geometry_column: &str,
) -> Result<usize> {
    check_layer(layer, list_layers(session, path)?)?;

    let sql = format!(
        "CREATE OR REPLACE TABLE {table} AS \
         SELECT * EXCLUDE ({geom}), ST_AsText({geom}) AS geometry \
         FROM st_read({path}, layer = {layer});",
        table = quote_ident(table),
        geom = quote_ident(geometry_column),
        path = quote_literal(path),
        layer = quote_literal(layer),
    );
    session.execute(&sql).map_err(classify_fetch_error)?;

    let rows = session.row_count(table)?;
    info!("Loaded {} features from layer `{}` into `{}`", rows, layer, table);

    Ok(rows)
}

fn check_layer(layer: &str, available: Vec<String>) -> Result<()> {
    if available.iter().any(|l| l == layer) {
        Ok(())
    } else {
        Err(RainfallError::LayerNotFound {
            layer: layer.to_string(),
            available,
        })
    }
}

/// Reports failures of the HTTP layer as transport errors.
fn classify_fetch_error(e: RainfallError) -> RainfallError {
    match e {
        RainfallError::Query(inner) => {
            let message = inner.to_string();
            if is_transport_message(&message) {
                RainfallError::Transport(message)
            } else {
                RainfallError::Query(inner)
            }
        }
        other => other,
    }
}

fn is_transport_message(message: &str) -> bool {
    ["HTTP", "IO Error", "Could not establish connection", "vsicurl"]
        .iter()
        .any(|needle| message.contains(needle))
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use tempfile::TempDir;

    use super::*;
    use crate::engine::Extension;

    const CSV: &str = "date,adm_level,PCODE,version,r3q,r3h,r3h_avg
2025-06-21,1,YE11,final,82.5,40.1,48.6
2025-07-01,1,YE11,prelim,79.0,38.2,48.4
2025-07-11,1,YE11,prelim,76.3,35.0,45.9
2025-07-11,1,YE18,prelim,64.8,12.5,19.3
";

    fn write_csv(dir: &Path) -> String {
        let path = dir.join("rainfall.csv");
        fs::write(&path, CSV).unwrap();
        path.to_string_lossy().to_string()
    }

    #[test]
    fn should_load_csv_idempotently() {
        let dir = TempDir::new().unwrap();
        let source = write_csv(dir.path());
        let session = Session::open().unwrap();

        let first = load_csv(&session, "rainfall", &source).unwrap();
        let before = session
            .query_strings(
                "SELECT string_agg(PCODE || date::VARCHAR || r3q::VARCHAR, ',' ORDER BY date, PCODE) FROM rainfall",
                &[],
            )
            .unwrap();

        let second = load_csv(&session, "rainfall", &source).unwrap();
        let after = session
            .query_strings(
                "SELECT string_agg(PCODE || date::VARCHAR || r3q::VARCHAR, ',' ORDER BY date, PCODE) FROM rainfall",
                &[],
            )
            .unwrap();

        assert_eq!(first, 4);
        assert_eq!(second, 4);
        assert_eq!(before, after);
    }

    #[test]
    fn should_infer_dates_from_header() {
        let dir = TempDir::new().unwrap();
        let source = write_csv(dir.path());
        let session = Session::open().unwrap();
        load_csv(&session, "rainfall", &source).unwrap();

        let types = session
            .query_strings(
                "SELECT data_type FROM information_schema.columns WHERE table_name = 'rainfall' AND column_name = 'date'",
                &[],
            )
            .unwrap();

        assert_eq!(types, vec!["DATE".to_string()]);
    }

    #[test]
    fn should_fail_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("missing.csv");
        let session = Session::open().unwrap();

        let result = load_csv(&session, "rainfall", &source.to_string_lossy());
        assert!(result.is_err());
    }

    #[test]
    fn should_compose_vsi_path() {
        let archive = ResourceDescriptor::new(
            "yem_adm_govyem_cso_ochayemen_20191002_gpkg.zip",
            "https://data.humdata.org/dataset/a1/resource/b2/download/yem_adm_govyem_cso_ochayemen_20191002_gpkg.zip",
        )
        .unwrap();

        assert_eq!(
            vsi_path(&archive),
            "/vsizip//vsicurl/https://data.humdata.org/dataset/a1/resource/b2/download/yem_adm_govyem_cso_ochayemen_20191002_gpkg.zip/yem_adm_govyem_cso_ochayemen_20191002_gpkg.gpkg"
        );
    }

    #[test]
    fn should_swap_archive_extension() {
        assert_eq!(geopackage_name("yem_adm_GPKG.zip"), "yem_adm_GPKG.gpkg");
        assert_eq!(geopackage_name("YEM_ADM.ZIP"), "YEM_ADM.GPKG");
        assert_eq!(geopackage_name("boundaries"), "boundaries.gpkg");
    }

    #[test]
    fn should_classify_http_failures() {
        assert!(is_transport_message(
            "IO Error: Could not establish connection error for HTTP HEAD to 'https://x'"
        ));
        assert!(!is_transport_message(
            "Binder Error: Referenced column \"shape\" not found"
        ));
    }

    #[test]
    fn should_accept_listed_layer() {
        let available = vec!["yem_admbnda_adm1".to_string(), "yem_admbnda_adm2".to_string()];
        assert!(check_layer("yem_admbnda_adm2", available).is_ok());
    }

    #[test]
    fn should_report_missing_layer_with_alternatives() {
        let available = vec!["yem_admbnda_adm1".to_string(), "yem_admbnda_adm2".to_string()];

        match check_layer("yem_admbnda_adm3", available) {
            Err(RainfallError::LayerNotFound { layer, available }) => {
                assert_eq!(layer, "yem_admbnda_adm3");
                assert_eq!(available.len(), 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    /// Writes a one-feature geopackage with the spatial extension.
    fn write_geopackage(session: &Session, dir: &Path) -> String {
        let path = dir.join("boundaries.gpkg").to_string_lossy().to_string();
        session
            .execute(&format!(
                "COPY (
                    SELECT 'YE11' AS admin1Pcode, 'Ibb' AS admin1Name_en,
                           ST_GeomFromText('POLYGON ((44 13.5, 44.5 13.5, 44.5 14, 44 14, 44 13.5))') AS geom
                 ) TO {} WITH (FORMAT GDAL, DRIVER 'GPKG');",
                quote_literal(&path)
            ))
            .unwrap();

        path
    }

    #[test]
    #[ignore = "downloads the spatial extension"]
    fn should_load_local_geopackage_layer() {
        let dir = TempDir::new().unwrap();
        let session = Session::open().unwrap();
        session.enable_extensions(&[Extension::Spatial]).unwrap();
        let path = write_geopackage(&session, dir.path());

        assert_eq!(list_layers(&session, &path).unwrap(), vec!["boundaries".to_string()]);

        let rows = load_layer_at(&session, "adm_1", &path, "boundaries", "geom").unwrap();
        assert_eq!(rows, 1);

        let wkt = session
            .query_strings("SELECT geometry FROM adm_1 WHERE admin1Pcode = 'YE11'", &[])
            .unwrap();
        assert!(wkt[0].starts_with("POLYGON"));

        let columns = session
            .query_strings(
                "SELECT column_name FROM information_schema.columns WHERE table_name = 'adm_1' ORDER BY column_name",
                &[],
            )
            .unwrap();
        assert!(!columns.contains(&"geom".to_string()));
        assert!(columns.contains(&"admin1Name_en".to_string()));
    }

    #[test]
    #[ignore = "downloads the spatial extension"]
    fn should_fail_on_missing_local_layer() {
        let dir = TempDir::new().unwrap();
        let session = Session::open().unwrap();
        session.enable_extensions(&[Extension::Spatial]).unwrap();
        let path = write_geopackage(&session, dir.path());

        let result = load_layer_at(&session, "adm_1", &path, "yem_admbnda_adm1", "geom");
        assert!(matches!(result, Err(RainfallError::LayerNotFound { .. })));
    }
}
