//! Location centroid table reader.
//!
//! Centroids feed the in-crate neighbor-edge builder; pipelines given a
//! ready-made edge table never read this one. Coordinates are expected in
//! a projected (planar, meter-unit) reference system.

use std::io::Read;
use std::path::Path;

use crime_panel_models::Centroid;

use crate::source::CsvTable;
use crate::{IngestError, open_file, parse_rows};

const TABLE: &str = "centroids";

const COLUMNS: &[&str] = &["location", "x", "y"];

/// Parses centroids from any CSV reader.
///
/// # Errors
///
/// Returns an error if a required column is missing or a coordinate
/// fails to parse.
pub fn parse(reader: impl Read) -> Result<Vec<Centroid>, IngestError> {
    parse_rows(reader, TABLE, COLUMNS)
}

impl CsvTable for Centroid {
    const TABLE: &'static str = TABLE;

    fn read_csv(path: &Path) -> Result<Vec<Self>, IngestError> {
        parse(open_file(path)?)
    }
}
