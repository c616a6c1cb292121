#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV readers for the pipeline's input tables.
//!
//! Every table the pipeline consumes has a reader module here. Readers
//! validate required headers before touching a single data row, so a
//! mis-shaped file fails with a [`IngestError::Schema`] naming the table
//! and the missing columns instead of a row-level type error deep into
//! the file. Malformed values are fatal; readers never skip rows.
//!
//! [`TableSource`] lets callers hand any table to the pipeline as a file
//! path, an in-memory `Vec`, or a deferred loader, resolved uniformly
//! through [`TableSource::resolve`].

pub mod centroids;
pub mod deprivation;
pub mod edges;
pub mod housing;
pub mod incidents;
pub mod population;
pub mod residential;
pub mod source;

use std::io::Read;

use thiserror::Error;

pub use source::{CsvTable, TableSource};

/// Errors that can occur while reading input tables.
#[derive(Debug, Error)]
pub enum IngestError {
    /// File could not be opened or read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV parsing or row deserialization failed.
    #[error("CSV error in {table} table: {source}")]
    Csv {
        /// Logical table name.
        table: &'static str,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Required columns are absent from the header row.
    #[error("{table} table is missing required columns: {missing}")]
    Schema {
        /// Logical table name.
        table: &'static str,
        /// Comma-separated missing column names.
        missing: String,
    },

    /// A cell value is present but unusable.
    #[error("invalid value in {table} table: {message}")]
    Value {
        /// Logical table name.
        table: &'static str,
        /// Description of the offending cell.
        message: String,
    },
}

/// Checks that every column in `required` appears in the header row.
pub(crate) fn require_columns<R: Read>(
    reader: &mut csv::Reader<R>,
    table: &'static str,
    required: &[&str],
) -> Result<(), IngestError> {
    let headers = reader
        .headers()
        .map_err(|e| IngestError::Csv { table, source: e })?;

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::Schema {
            table,
            missing: missing.join(", "),
        })
    }
}

/// Opens `path` for a reader, mapping failures onto [`IngestError::Io`].
pub(crate) fn open_file(path: &std::path::Path) -> Result<std::fs::File, IngestError> {
    std::fs::File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Validates headers, then deserializes every row of a plain table.
pub(crate) fn parse_rows<T: serde::de::DeserializeOwned>(
    reader: impl Read,
    table: &'static str,
    required: &[&str],
) -> Result<Vec<T>, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    require_columns(&mut csv_reader, table, required)?;

    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<T>() {
        rows.push(result.map_err(|e| IngestError::Csv { table, source: e })?);
    }

    log::debug!("{table}: {} rows", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_all_missing_columns_at_once() {
        let data = "location,extra\nA,1\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let err = require_columns(&mut reader, "edges", &["location", "neighbor", "rank"])
            .unwrap_err();
        match err {
            IngestError::Schema { table, missing } => {
                assert_eq!(table, "edges");
                assert_eq!(missing, "neighbor, rank");
            }
            other => panic!("expected schema error, got {other}"),
        }
    }

    #[test]
    fn accepts_headers_in_any_order() {
        let data = "rank,location,neighbor\n1,A,B\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        assert!(require_columns(&mut reader, "edges", &["location", "neighbor", "rank"]).is_ok());
    }
}
