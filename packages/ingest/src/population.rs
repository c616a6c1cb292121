//! Wide population/density table reader.
//!
//! The source table is wide by year: a `location` column plus paired
//! `population_<year>` / `density_<year>` columns, one pair per observed
//! year. Reading melts it to long [`DemographicObservation`] rows; years
//! with empty cells for a location simply yield no observation (in-range
//! gaps are never interpolated downstream).

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use regex::Regex;

use crime_panel_models::DemographicObservation;

use crate::source::CsvTable;
use crate::{IngestError, open_file};

const TABLE: &str = "population";

/// Parses and melts the wide table from any CSV reader.
///
/// # Errors
///
/// Returns an error if the `location` column is absent, no
/// `population_<year>` columns are found, a population year lacks its
/// matching density column, or a non-empty cell fails to parse.
pub fn parse(reader: impl Read) -> Result<Vec<DemographicObservation>, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader
        .headers()
        .map_err(|e| IngestError::Csv {
            table: TABLE,
            source: e,
        })?
        .clone();

    let Some(location_idx) = headers.iter().position(|h| h == "location") else {
        return Err(IngestError::Schema {
            table: TABLE,
            missing: "location".to_string(),
        });
    };

    let year_re =
        Regex::new(r"^(population|density)_([0-9]{4})$").unwrap_or_else(|_| unreachable!());

    let mut population_cols: Vec<(usize, i32)> = Vec::new();
    let mut density_cols: BTreeMap<i32, usize> = BTreeMap::new();
    for (index, name) in headers.iter().enumerate() {
        let Some(caps) = year_re.captures(name) else {
            continue;
        };
        let Ok(year) = caps[2].parse::<i32>() else {
            continue;
        };
        if &caps[1] == "population" {
            population_cols.push((index, year));
        } else {
            density_cols.insert(year, index);
        }
    }
    population_cols.sort_by_key(|&(_, year)| year);

    if population_cols.is_empty() {
        return Err(IngestError::Schema {
            table: TABLE,
            missing: "population_<year>".to_string(),
        });
    }

    let unpaired: Vec<String> = population_cols
        .iter()
        .filter(|(_, year)| !density_cols.contains_key(year))
        .map(|(_, year)| format!("density_{year}"))
        .collect();
    if !unpaired.is_empty() {
        return Err(IngestError::Schema {
            table: TABLE,
            missing: unpaired.join(", "),
        });
    }

    let mut observations = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| IngestError::Csv {
            table: TABLE,
            source: e,
        })?;

        let location = record.get(location_idx).unwrap_or("").trim();
        if location.is_empty() {
            return Err(IngestError::Value {
                table: TABLE,
                message: "row with empty location".to_string(),
            });
        }

        for &(col, year) in &population_cols {
            let Some(&density_col) = density_cols.get(&year) else {
                continue;
            };
            let pop_cell = record.get(col).unwrap_or("").trim();
            let den_cell = record.get(density_col).unwrap_or("").trim();

            match (pop_cell.is_empty(), den_cell.is_empty()) {
                (true, true) => {}
                (false, false) => observations.push(DemographicObservation {
                    location: location.to_string(),
                    year,
                    population: parse_cell(pop_cell, "population", year, location)?,
                    density: parse_cell(den_cell, "density", year, location)?,
                }),
                _ => log::warn!(
                    "population: {location} year {year} has only one of population/density, \
                     treating the year as unobserved"
                ),
            }
        }
    }

    log::debug!(
        "population: {} observations across {} year columns",
        observations.len(),
        population_cols.len()
    );
    Ok(observations)
}

fn parse_cell(cell: &str, kind: &str, year: i32, location: &str) -> Result<f64, IngestError> {
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(IngestError::Value {
            table: TABLE,
            message: format!("{kind}_{year} for location {location}: {cell:?} is not a number"),
        }),
    }
}

impl CsvTable for DemographicObservation {
    const TABLE: &'static str = TABLE;

    fn read_csv(path: &Path) -> Result<Vec<Self>, IngestError> {
        parse(open_file(path)?)
    }
}
