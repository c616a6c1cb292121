#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared types for the crime panel feature pipeline.
//!
//! Defines the calendar [`Period`] key, the auxiliary table row types
//! (neighbor edges, demographic observations, deprivation snapshots,
//! housing profiles), the wide [`PanelRow`] that every pipeline stage
//! fills in, and the [`FeatureParams`] bundle that parametrizes the
//! engines. All row types are plain serde-derived structs so the ingest
//! and export layers can move them through CSV without adapters.

pub mod params;
pub mod period;
pub mod rows;

pub use params::FeatureParams;
pub use period::{HOLIDAY_MONTHS, Period, PeriodParseError, is_holiday_month};
pub use rows::{
    Centroid, DataQuality, DemographicObservation, DeprivationEpoch, DeprivationRecord,
    HousingProfile, NeighborEdge, PanelRow, RawIncident, ResidentialClass,
};
