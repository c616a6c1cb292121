//! Housing stock composition table reader.

use std::io::Read;
use std::path::Path;

use crime_panel_models::HousingProfile;

use crate::source::CsvTable;
use crate::{IngestError, open_file, parse_rows};

const TABLE: &str = "housing";

const COLUMNS: &[&str] = &[
    "location",
    "detached",
    "semi_detached",
    "terraced",
    "flat",
    "other",
];

/// Parses housing profiles from any CSV reader.
///
/// # Errors
///
/// Returns an error if a required column is missing or a fraction fails
/// to parse.
pub fn parse(reader: impl Read) -> Result<Vec<HousingProfile>, IngestError> {
    parse_rows(reader, TABLE, COLUMNS)
}

impl CsvTable for HousingProfile {
    const TABLE: &'static str = TABLE;

    fn read_csv(path: &Path) -> Result<Vec<Self>, IngestError> {
        parse(open_file(path)?)
    }
}
