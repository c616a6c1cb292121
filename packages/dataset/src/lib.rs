#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pipeline orchestration for the crime panel.
//!
//! This crate owns everything above the individual engines: bundling the
//! input tables ([`PanelSources`]), running the stages in order
//! ([`build_panel`]), cutting the leak-free chronological train/test
//! split, exporting the CSV artifacts, and stamping the run manifest
//! that records what was built from which inputs.

pub mod export;
pub mod manifest;
pub mod pipeline;
pub mod sources;
pub mod split;

use std::path::Path;

use thiserror::Error;

pub use export::{
    FEATURES_FILE, X_TEST_FILE, X_TRAIN_FILE, Y_TEST_FILE, Y_TRAIN_FILE, write_features,
    write_split,
};
pub use manifest::{
    InputFingerprint, MANIFEST_FILE, MANIFEST_VERSION, RunManifest, fingerprint_files,
    write_manifest,
};
pub use pipeline::{BuiltPanel, build_panel, validate_params};
pub use sources::{NeighborSource, PanelSources};
pub use split::{ChronologicalSplit, chronological_split};

use crime_panel_demographics::DemographicsError;
use crime_panel_grid::GridError;
use crime_panel_ingest::IngestError;
use crime_panel_spatial::SpatialError;

/// Errors that can occur while orchestrating a pipeline run.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// An input table failed to load or parse.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Period normalization of the incident table failed.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// A used deprivation year band has no snapshot table.
    #[error(transparent)]
    Demographics(#[from] DemographicsError),

    /// The neighbor-edge or centroid table is malformed.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// I/O failure on an output artifact.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV serialization failed while writing an output table.
    #[error("CSV error writing {table}: {source}")]
    Csv {
        /// Output file name.
        table: &'static str,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Run-manifest serialization failed.
    #[error("manifest serialization failed: {0}")]
    Manifest(#[from] serde_json::Error),

    /// A run parameter is outside its valid range.
    #[error("invalid parameter {name}: {message}")]
    Parameter {
        /// Parameter field name.
        name: &'static str,
        /// What is wrong with the value.
        message: String,
    },
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> DatasetError {
    DatasetError::Io {
        path: path.display().to_string(),
        source,
    }
}
