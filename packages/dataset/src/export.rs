//! CSV export of the engineered panel.
//!
//! Three artifact families: the complete feature table, the X matrices
//! with the target column dropped, and the y vectors carrying the bare
//! target keyed by location and period. All of them serialize through
//! the row types' serde field order, so the column order is the struct
//! field order.

use std::fs::File;
use std::path::Path;

use crime_panel_models::PanelRow;
use csv::Writer;
use log::info;
use serde::Serialize;

use crate::split::ChronologicalSplit;
use crate::{DatasetError, io_error};

/// Full feature table, every column included.
pub const FEATURES_FILE: &str = "features.csv";
/// Training features, target column dropped.
pub const X_TRAIN_FILE: &str = "X_train.csv";
/// Test features, target column dropped.
pub const X_TEST_FILE: &str = "X_test.csv";
/// Training target keyed by (location, period).
pub const Y_TRAIN_FILE: &str = "y_train.csv";
/// Test target keyed by (location, period).
pub const Y_TEST_FILE: &str = "y_test.csv";

/// Column name of the prediction target.
const TARGET_COLUMN: &str = "incident_count";

/// One target row: the bare count plus its panel key.
#[derive(Debug, Serialize)]
struct TargetRow<'a> {
    location: &'a str,
    year: i32,
    month: u32,
    incident_count: u32,
}

/// Writes the full feature table to `dir/features.csv` and returns its
/// column count.
///
/// # Errors
///
/// Returns an error if the file cannot be written or a row fails to
/// serialize.
pub fn write_features(dir: &Path, rows: &[PanelRow]) -> Result<usize, DatasetError> {
    let path = dir.join(FEATURES_FILE);
    let mut writer = file_writer(&path, FEATURES_FILE)?;
    for row in rows {
        writer.serialize(row).map_err(|source| DatasetError::Csv {
            table: FEATURES_FILE,
            source,
        })?;
    }
    flush(writer, &path)?;

    let mut reader = csv::Reader::from_path(&path).map_err(|source| DatasetError::Csv {
        table: FEATURES_FILE,
        source,
    })?;
    let columns = reader
        .headers()
        .map_err(|source| DatasetError::Csv {
            table: FEATURES_FILE,
            source,
        })?
        .len();
    info!(
        "wrote {} rows, {columns} columns to {}",
        rows.len(),
        path.display()
    );
    Ok(columns)
}

/// Writes the X/y train/test files into `dir`.
///
/// # Errors
///
/// Returns an error if any of the four files cannot be written.
pub fn write_split(dir: &Path, split: &ChronologicalSplit) -> Result<(), DatasetError> {
    write_feature_matrix(&dir.join(X_TRAIN_FILE), X_TRAIN_FILE, &split.train)?;
    write_feature_matrix(&dir.join(X_TEST_FILE), X_TEST_FILE, &split.test)?;
    write_target(&dir.join(Y_TRAIN_FILE), Y_TRAIN_FILE, &split.train)?;
    write_target(&dir.join(Y_TEST_FILE), Y_TEST_FILE, &split.test)?;
    info!("wrote split artifacts to {}", dir.display());
    Ok(())
}

/// Serializes `rows` with the target column dropped. The rows are staged
/// through an in-memory CSV buffer so the column to drop is located by
/// header name, not by a hard-coded position.
fn write_feature_matrix(
    path: &Path,
    table: &'static str,
    rows: &[PanelRow],
) -> Result<(), DatasetError> {
    let mut writer = file_writer(path, table)?;
    if rows.is_empty() {
        return flush(writer, path);
    }

    let mut bytes = Vec::new();
    {
        let mut buffer = Writer::from_writer(&mut bytes);
        for row in rows {
            buffer
                .serialize(row)
                .map_err(|source| DatasetError::Csv { table, source })?;
        }
        buffer.flush().map_err(|source| io_error(path, source))?;
    }

    let mut reader = csv::Reader::from_reader(bytes.as_slice());
    let headers = reader
        .headers()
        .map_err(|source| DatasetError::Csv { table, source })?
        .clone();
    let target = headers
        .iter()
        .position(|header| header == TARGET_COLUMN)
        .unwrap_or_else(|| unreachable!());

    write_without_column(&mut writer, headers.iter(), target, table)?;
    for record in reader.records() {
        let record = record.map_err(|source| DatasetError::Csv { table, source })?;
        write_without_column(&mut writer, record.iter(), target, table)?;
    }
    flush(writer, path)
}

fn write_without_column<'a>(
    writer: &mut Writer<File>,
    fields: impl Iterator<Item = &'a str>,
    skip: usize,
    table: &'static str,
) -> Result<(), DatasetError> {
    let kept = fields
        .enumerate()
        .filter(|(index, _)| *index != skip)
        .map(|(_, field)| field);
    writer
        .write_record(kept)
        .map_err(|source| DatasetError::Csv { table, source })
}

fn write_target(path: &Path, table: &'static str, rows: &[PanelRow]) -> Result<(), DatasetError> {
    let mut writer = file_writer(path, table)?;
    for row in rows {
        let record = TargetRow {
            location: &row.location,
            year: row.year,
            month: row.month,
            incident_count: row.incident_count,
        };
        writer
            .serialize(record)
            .map_err(|source| DatasetError::Csv { table, source })?;
    }
    flush(writer, path)
}

fn file_writer(path: &Path, table: &'static str) -> Result<Writer<File>, DatasetError> {
    Writer::from_path(path).map_err(|source| DatasetError::Csv { table, source })
}

fn flush(mut writer: Writer<File>, path: &Path) -> Result<(), DatasetError> {
    writer.flush().map_err(|source| io_error(path, source))
}
