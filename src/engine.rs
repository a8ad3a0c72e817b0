//! The analytical query session holding every table of a run.

use duckdb::{arrow::record_batch::RecordBatch, Connection, ToSql};
use log::{debug, info};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Extension {
    /// Geometry types, `st_read` and the GDAL virtual file systems
    Spatial,
    /// Reading files over HTTP(S)
    Httpfs,
}

impl Extension {
    pub fn name(&self) -> &'static str {
        match self {
            Extension::Spatial => "spatial",
            Extension::Httpfs => "httpfs",
        }
    }
}

/// Names of the tables a session holds once the sources are loaded.
pub mod tables {
    pub const RAINFALL: &str = "rainfall";
    pub const ADM_1: &str = "adm_1";
    pub const ADM_2: &str = "adm_2";
}

/// A single in-memory DuckDB connection.
pub struct Session {
    conn: Connection,
}

impl Session {
    pub fn open() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Session { conn })
    }

    /// Opens a session with the extensions required by the remote loaders.
    pub fn open_with_extensions() -> Result<Self> {
        let session = Session::open()?;
        session.enable_extensions(&[Extension::Spatial, Extension::Httpfs])?;

        Ok(session)
    }

    pub fn enable_extensions(&self, extensions: &[Extension]) -> Result<()> {
        for extension in extensions {
            let name = extension.name();
            self.execute(&format!("INSTALL {name}; LOAD {name};"))?;
            info!("Loaded extension `{}`", name);
        }

        Ok(())
    }

    /// Runs one or more statements that return no rows.
    pub fn execute(&self, sql: &str) -> Result<()> {
        debug!("{}", sql.trim());
        self.conn.execute_batch(sql)?;

        Ok(())
    }

    pub fn query_arrow(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<RecordBatch>> {
        debug!("{}", sql.trim());
        let mut stmt = self.conn.prepare(sql)?;
        let batches = stmt.query_arrow(params)?.collect();

        Ok(batches)
    }

    /// Runs a query whose first column is text and returns that column.
    pub fn query_strings(&self, sql: &str, params: &[&dyn ToSql]) -> Result<Vec<String>> {
        debug!("{}", sql.trim());
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT count(*) FROM {}", quote_ident(table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;

        Ok(count as usize)
    }
}

/// Quotes a string for use as an SQL literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Quotes a table or column name.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

// -- Tests -------------------------------------------------------------------
