//! Deprivation snapshot table reader.
//!
//! One file per snapshot epoch; all three epochs share this schema. Which
//! epoch a file represents is decided by the caller wiring it into the
//! pipeline, not by anything inside the file.

use std::io::Read;
use std::path::Path;

use crime_panel_models::DeprivationRecord;

use crate::source::CsvTable;
use crate::{IngestError, open_file, parse_rows};

const TABLE: &str = "deprivation";

const COLUMNS: &[&str] = &[
    "location",
    "imd_score",
    "income_score",
    "employment_score",
    "education_score",
    "health_score",
    "crime_score",
    "housing_barriers_score",
    "living_env_score",
];

/// Parses deprivation records from any CSV reader.
///
/// # Errors
///
/// Returns an error if any of the nine required columns is missing or a
/// score fails to parse.
pub fn parse(reader: impl Read) -> Result<Vec<DeprivationRecord>, IngestError> {
    parse_rows(reader, TABLE, COLUMNS)
}

impl CsvTable for DeprivationRecord {
    const TABLE: &'static str = TABLE;

    fn read_csv(path: &Path) -> Result<Vec<Self>, IngestError> {
        parse(open_file(path)?)
    }
}
