//! The run manifest.
//!
//! Every run writes a `manifest.json` next to its CSV artifacts recording
//! what was built from what: schema version, timestamp, parameters, table
//! shapes, sha256 fingerprints of the file-backed inputs, and the
//! data-quality counters accumulated during the joins. The pipeline is
//! deterministic, so two manifests with equal fingerprints and parameters
//! describe equal artifacts.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::Utc;
use crime_panel_models::{DataQuality, FeatureParams, PanelRow, Period};
use log::info;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::split::ChronologicalSplit;
use crate::{DatasetError, io_error};

/// Manifest file name.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Current manifest schema version. Bump this when the manifest format
/// changes in a backward-incompatible way.
pub const MANIFEST_VERSION: u32 = 1;

/// One hashed input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputFingerprint {
    /// Manifest label of the table.
    pub table: String,
    /// Path the table was read from.
    pub path: String,
    /// Hex sha256 of the file contents.
    pub sha256: String,
}

/// Record of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    /// Manifest schema version.
    pub version: u32,
    /// RFC 3339 timestamp of the run.
    pub generated_at: String,
    /// Parameters the run was built with.
    pub parameters: FeatureParams,
    /// Total feature-table rows.
    pub rows: usize,
    /// Feature-table columns.
    pub columns: usize,
    /// Distinct locations in the panel.
    pub locations: usize,
    /// Distinct periods in the panel.
    pub periods: usize,
    /// Rows on the training side of the split.
    pub train_rows: usize,
    /// Rows on the test side of the split.
    pub test_rows: usize,
    /// First test period, `"YYYY-MM"`, absent when every period trains.
    pub split_boundary: Option<String>,
    /// Fingerprints of the file-backed inputs.
    pub inputs: Vec<InputFingerprint>,
    /// Data-quality counters from the auxiliary joins.
    pub quality: DataQuality,
}

impl RunManifest {
    /// Assembles the manifest of a finished run, stamped with the current
    /// schema version and time.
    #[must_use]
    pub fn capture(
        params: &FeatureParams,
        quality: &DataQuality,
        split: &ChronologicalSplit,
        columns: usize,
        inputs: Vec<InputFingerprint>,
    ) -> Self {
        let locations: BTreeSet<&str> = split
            .train
            .iter()
            .chain(&split.test)
            .map(|row| row.location.as_str())
            .collect();
        let periods: BTreeSet<Period> = split
            .train
            .iter()
            .chain(&split.test)
            .map(PanelRow::period)
            .collect();
        Self {
            version: MANIFEST_VERSION,
            generated_at: Utc::now().to_rfc3339(),
            parameters: params.clone(),
            rows: split.train.len() + split.test.len(),
            columns,
            locations: locations.len(),
            periods: periods.len(),
            train_rows: split.train.len(),
            test_rows: split.test.len(),
            split_boundary: split.boundary.map(format_period),
            inputs,
            quality: quality.clone(),
        }
    }
}

/// Hashes each labeled input file, preserving the given order.
///
/// # Errors
///
/// Returns [`DatasetError::Io`] if a file cannot be read.
pub fn fingerprint_files(
    inputs: &[(&'static str, &Path)],
) -> Result<Vec<InputFingerprint>, DatasetError> {
    inputs
        .iter()
        .map(|&(table, path)| {
            let bytes = fs::read(path).map_err(|source| io_error(path, source))?;
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            Ok(InputFingerprint {
                table: table.to_string(),
                path: path.display().to_string(),
                sha256: hex::encode(hasher.finalize()),
            })
        })
        .collect()
}

/// Writes `manifest` to `dir/manifest.json`.
///
/// The contents go to a `.tmp` sibling first and are renamed into place,
/// so an interrupted run never leaves a truncated manifest behind.
///
/// # Errors
///
/// Returns an error if serialization or the file writes fail.
pub fn write_manifest(dir: &Path, manifest: &RunManifest) -> Result<(), DatasetError> {
    let path = dir.join(MANIFEST_FILE);
    let tmp = dir.join("manifest.json.tmp");
    let contents = serde_json::to_string_pretty(manifest)?;
    fs::write(&tmp, contents).map_err(|source| io_error(&tmp, source))?;
    fs::rename(&tmp, &path).map_err(|source| io_error(&path, source))?;
    info!("saved run manifest to {}", path.display());
    Ok(())
}

fn format_period(period: Period) -> String {
    format!("{:04}-{:02}", period.year, period.month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("crime_panel_manifest_{name}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn row(location: &str, month: u32) -> PanelRow {
        PanelRow {
            location: location.to_string(),
            year: 2021,
            month,
            ..PanelRow::default()
        }
    }

    #[test]
    fn fingerprints_hash_file_contents() {
        let dir = scratch_dir("hash");
        let path = dir.join("input.csv");
        fs::write(&path, b"abc").unwrap();

        let prints = fingerprint_files(&[("incidents", &path)]).unwrap();
        assert_eq!(prints.len(), 1);
        assert_eq!(prints[0].table, "incidents");
        assert_eq!(
            prints[0].sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn missing_input_file_is_an_io_error() {
        let missing = std::env::temp_dir().join("crime_panel_manifest_no_such_file.csv");
        let result = fingerprint_files(&[("incidents", &missing)]);
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }

    #[test]
    fn capture_counts_shapes_from_the_split() {
        let split = ChronologicalSplit {
            train: vec![row("a", 1), row("b", 1), row("a", 2), row("b", 2)],
            test: vec![row("a", 3), row("b", 3)],
            boundary: Some(Period {
                year: 2021,
                month: 3,
            }),
        };
        let manifest = RunManifest::capture(
            &FeatureParams::default(),
            &DataQuality::default(),
            &split,
            60,
            Vec::new(),
        );

        assert_eq!(manifest.version, MANIFEST_VERSION);
        assert_eq!(manifest.rows, 6);
        assert_eq!(manifest.locations, 2);
        assert_eq!(manifest.periods, 3);
        assert_eq!(manifest.train_rows, 4);
        assert_eq!(manifest.test_rows, 2);
        assert_eq!(manifest.split_boundary.as_deref(), Some("2021-03"));
    }

    #[test]
    fn manifest_lands_as_pretty_json() {
        let dir = scratch_dir("write");
        let split = ChronologicalSplit {
            train: vec![row("a", 1)],
            test: Vec::new(),
            boundary: None,
        };
        let manifest = RunManifest::capture(
            &FeatureParams::default(),
            &DataQuality::default(),
            &split,
            60,
            Vec::new(),
        );
        write_manifest(&dir, &manifest).unwrap();

        let contents = fs::read_to_string(dir.join(MANIFEST_FILE)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed["version"], 1);
        assert_eq!(parsed["rows"], 1);
        assert!(parsed["parameters"]["max_lag"].is_number());
        assert!(parsed["quality"]["locations_missing_population"].is_number());
        assert!(!dir.join("manifest.json.tmp").exists());
    }
}
