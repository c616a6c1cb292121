//! Raw incident table reader.
//!
//! Expects `location` and `period` columns; an optional `count` column
//! carries pre-aggregated counts. Sources listing one incident per row
//! simply omit `count` and every row reads as 1.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crime_panel_models::RawIncident;

use crate::source::CsvTable;
use crate::{IngestError, open_file, require_columns};

const TABLE: &str = "incidents";

#[derive(Debug, Deserialize)]
struct IncidentRecord {
    location: String,
    period: String,
    #[serde(default)]
    count: Option<u32>,
}

/// Parses incident rows from any CSV reader.
///
/// # Errors
///
/// Returns an error if required columns are missing or a row fails to
/// parse. Period strings are not interpreted here; the time normalizer
/// parses them.
pub fn parse(reader: impl Read) -> Result<Vec<RawIncident>, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    require_columns(&mut csv_reader, TABLE, &["location", "period"])?;

    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<IncidentRecord>() {
        let record = result.map_err(|e| IngestError::Csv {
            table: TABLE,
            source: e,
        })?;
        rows.push(RawIncident {
            location: record.location,
            period: record.period,
            count: record.count.unwrap_or(1),
        });
    }

    log::debug!("incidents: {} raw rows", rows.len());
    Ok(rows)
}

impl CsvTable for RawIncident {
    const TABLE: &'static str = TABLE;

    fn read_csv(path: &Path) -> Result<Vec<Self>, IngestError> {
        parse(open_file(path)?)
    }
}
