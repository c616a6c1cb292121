#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Turns the sparse incident list into a dense space-time panel.
//!
//! Two stages: [`time::normalize`] parses every period string exactly
//! once and derives the per-period columns; [`grid::complete`] crosses
//! distinct locations with distinct periods and zero-fills the cells no
//! incident fell into, so every later stage can assume a complete,
//! (location, period)-sorted panel.

pub mod grid;
pub mod time;

use thiserror::Error;

pub use grid::complete;
pub use time::{Normalized, NormalizedIncident, PeriodContext, normalize};

/// Errors that can occur while building the dense grid.
#[derive(Debug, Error)]
pub enum GridError {
    /// A raw period string failed to parse.
    #[error("{0}")]
    Period(#[from] crime_panel_models::PeriodParseError),
}
