//! Tunable pipeline parameters.
//!
//! Everything here can be overridden from a TOML parameter file; fields
//! left out fall back to the defaults below. Window sizes of the named
//! feature columns are not parameters: each window is its own column in
//! the output schema.

use serde::{Deserialize, Serialize};

/// Knobs of the feature pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureParams {
    /// Deepest lag (in months) the revictimization risk sum reaches back.
    pub max_lag: usize,
    /// Base probability scaling the revictimization risk score.
    pub base_probability: f64,
    /// Neighbors per location in the edge table.
    pub neighbors_k: usize,
    /// Additive distance bias for inverse-distance weights
    /// `w = 1 / (distance + bias)`; keeps near-zero distances bounded.
    pub distance_bias: f64,
    /// Fraction of distinct periods assigned to the training side of the
    /// chronological split.
    pub train_fraction: f64,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            max_lag: 24,
            base_probability: 0.134,
            neighbors_k: 5,
            distance_bias: 100.0,
            train_fraction: 0.7,
        }
    }
}

impl FeatureParams {
    /// Parses parameters from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or contains unknown keys.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::de::from_str(toml_str)
    }
}
