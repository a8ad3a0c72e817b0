//! Queries run against the loaded `rainfall`, `adm_1` and `adm_2` tables.

use chrono::NaiveDate;
use duckdb::{
    arrow::{
        array::{Array, Float64Array, StringArray},
        record_batch::RecordBatch,
    },
    ToSql,
};

use crate::{
    engine::{tables, Session},
    error::{RainfallError, Result},
    selector::{AdminUnit, DateVersion},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdminLevel {
    /// Governorates
    One,
    /// Districts
    Two,
}

impl AdminLevel {
    pub fn from_number(level: u8) -> Result<Self> {
        match level {
            1 => Ok(AdminLevel::One),
            2 => Ok(AdminLevel::Two),
            other => Err(RainfallError::Parse(format!("admin level {other}"))),
        }
    }

    pub fn number(&self) -> i32 {
        match self {
            AdminLevel::One => 1,
            AdminLevel::Two => 2,
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            AdminLevel::One => tables::ADM_1,
            AdminLevel::Two => tables::ADM_2,
        }
    }

    pub fn pcode_column(&self) -> String {
        format!("admin{}Pcode", self.number())
    }

    pub fn name_column(&self) -> String {
        format!("admin{}Name_en", self.number())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Observed and long-term average 3-month rainfall of one dekad.
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub rfh: Option<f64>,
    pub rfh_avg: Option<f64>,
}

/// Every dekad of the governorate series with its data version, newest first.
pub fn date_versions(session: &Session) -> Result<Vec<DateVersion>> {
    let sql = format!(
        "SELECT DISTINCT date::VARCHAR || ': ' || version AS date_ver \
         FROM {} WHERE adm_level = 1 ORDER BY date_ver DESC",
        tables::RAINFALL
    );
    session
        .query_strings(&sql, &[])?
        .iter()
        .map(|s| s.parse())
        .collect()
}

/// Administrative units of a level, optionally restricted to one governorate.
pub fn admin_units(
    session: &Session,
    level: AdminLevel,
    parent: Option<&str>,
) -> Result<Vec<AdminUnit>> {
    let order = match level {
        AdminLevel::One => level.pcode_column(),
        AdminLevel::Two => level.name_column(),
    };
    let mut sql = format!(
        "SELECT {} || ': ' || {} FROM {}",
        level.pcode_column(),
        level.name_column(),
        level.table()
    );
    let mut params: Vec<&dyn ToSql> = Vec::new();
    if let (AdminLevel::Two, Some(parent)) = (level, &parent) {
        sql.push_str(" WHERE admin1Pcode = ?");
        params.push(parent);
    }
    sql.push_str(&format!(" ORDER BY {}", order));

    session
        .query_strings(&sql, &params)?
        .iter()
        .map(|s| s.parse())
        .collect()
}

/// Anomaly of every unit of `level` on `date`, joined with its boundary.
///
/// Level-2 views are restricted to the districts of `parent` when given.
pub fn joined_view(
    session: &Session,
    level: AdminLevel,
    date: NaiveDate,
    parent: Option<&str>,
) -> Result<Vec<RecordBatch>> {
    let name = level.name_column();
    let pcode = level.pcode_column();
    let filter = match (level, parent) {
        (AdminLevel::Two, Some(_)) => "WHERE admin1Pcode = ?",
        _ => "",
    };

    let sql = format!(
        "WITH
            adm AS (
                SELECT {name}, {pcode} AS PCODE, geometry
                FROM {table}
                {filter}
            ),
            rf AS (
                SELECT date, r3q, PCODE
                FROM {rainfall}
                WHERE adm_level = ? AND date = ?::DATE
            )
        SELECT
            rf.date::VARCHAR AS date,
            rf.r3q::DOUBLE AS r3q,
            rf.PCODE,
            adm.{name},
            adm.geometry
        FROM rf JOIN adm ON rf.PCODE = adm.PCODE
        ORDER BY rf.PCODE",
        table = level.table(),
        rainfall = tables::RAINFALL,
    );

    let level_number = level.number();
    let date = date.format("%Y-%m-%d").to_string();
    let mut params: Vec<&dyn ToSql> = Vec::new();
    if let (AdminLevel::Two, Some(parent)) = (level, &parent) {
        params.push(parent);
    }
    params.push(&level_number);
    params.push(&date);

    session.query_arrow(&sql, &params)
}

/// Full rainfall series of one unit, ordered by date.
pub fn district_series(session: &Session, pcode: &str) -> Result<Vec<SeriesPoint>> {
    let sql = format!(
        "SELECT date::VARCHAR AS date, round(r3h, 2)::DOUBLE AS rfh, round(r3h_avg, 2)::DOUBLE AS rfh_avg \
         FROM {} WHERE PCODE = ? ORDER BY date",
        tables::RAINFALL
    );
    let batches = session.query_arrow(&sql, &[&pcode])?;

    let mut points = Vec::new();
    for batch in &batches {
        let dates = string_column(batch, "date")?;
        let rfh = f64_column(batch, "rfh")?;
        let rfh_avg = f64_column(batch, "rfh_avg")?;

        for i in 0..batch.num_rows() {
            let date = NaiveDate::parse_from_str(dates.value(i), "%Y-%m-%d")
                .map_err(|_| RainfallError::Parse(dates.value(i).to_string()))?;
            points.push(SeriesPoint {
                date,
                rfh: (!rfh.is_null(i)).then(|| rfh.value(i)),
                rfh_avg: (!rfh_avg.is_null(i)).then(|| rfh_avg.value(i)),
            });
        }
    }

    Ok(points)
}

pub fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| RainfallError::Parse(format!("text column `{name}`")))
}

pub fn f64_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
        .ok_or_else(|| RainfallError::Parse(format!("numeric column `{name}`")))
}


// -- Tests -------------------------------------------------------------------
