//! Residential land-use classification reader.

use std::io::Read;
use std::path::Path;

use crime_panel_models::ResidentialClass;

use crate::source::CsvTable;
use crate::{IngestError, open_file, parse_rows};

const TABLE: &str = "residential";

const COLUMNS: &[&str] = &["location", "is_residential_dominant"];

/// Parses residential classifications from any CSV reader.
///
/// # Errors
///
/// Returns an error if a required column is missing or the flag is not
/// `true`/`false`.
pub fn parse(reader: impl Read) -> Result<Vec<ResidentialClass>, IngestError> {
    parse_rows(reader, TABLE, COLUMNS)
}

impl CsvTable for ResidentialClass {
    const TABLE: &'static str = TABLE;

    fn read_csv(path: &Path) -> Result<Vec<Self>, IngestError> {
        parse(open_file(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_boolean_flags() {
        let data = "location,is_residential_dominant\nA,true\nB,false\n";
        let rows = parse(data.as_bytes()).unwrap();
        assert!(rows[0].is_residential_dominant);
        assert!(!rows[1].is_residential_dominant);
    }

    #[test]
    fn rejects_non_boolean_flag() {
        let data = "location,is_residential_dominant\nA,mostly\n";
        assert!(matches!(
            parse(data.as_bytes()),
            Err(IngestError::Csv { .. })
        ));
    }
}
