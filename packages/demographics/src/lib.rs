#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Joins the auxiliary demographic tables onto the dense panel.
//!
//! Three independent joins: population/density with per-location trend
//! extrapolation, deprivation scores by snapshot year band, and static
//! housing composition. Locations absent from a source are recovered
//! per each join's rule (nulls or flagged zero-fill), counted in
//! [`crime_panel_models::DataQuality`], and logged; they never abort
//! the run. The only fatal condition is a year band in use whose
//! deprivation snapshot was not provided.

pub mod deprivation;
pub mod housing;
pub mod population;

use thiserror::Error;

use crime_panel_models::DeprivationEpoch;

/// Errors that can occur while joining demographic tables.
#[derive(Debug, Error)]
pub enum DemographicsError {
    /// The panel covers years whose deprivation snapshot is missing.
    #[error("no {epoch} deprivation snapshot, needed for panel years {years}")]
    MissingSnapshot {
        /// The epoch without a table.
        epoch: DeprivationEpoch,
        /// Year range of the panel rows that needed it.
        years: String,
    },
}
