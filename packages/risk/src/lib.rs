#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::cargo_common_metadata)]

//! Revictimization risk scoring.
//!
//! Once a location is hit, the chance of a repeat decays with the months
//! elapsed since. Each row's score convolves the location's past counts
//! with a fixed timing-decay curve, so a burst of recent incidents drives
//! the score up and a long quiet stretch lets it fade back toward zero.

use crime_panel_models::PanelRow;
use crime_panel_temporal::scan_partitions;
use log::info;

// Power-law decay coefficients fitted offline on repeat-victimization
// timing data (Kleemans); they are not tunable per run.
const DECAY_SCALE: f64 = 0.106;
const DECAY_EXPONENT: f64 = -0.383;
const DECAY_OFFSET: f64 = 0.018;

/// Timing-decay weight for an incident `lag` months in the past.
///
/// Lag zero is the scored month itself and carries no weight; the tail is
/// clamped at zero once the power term falls below the offset.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn decay_weight(lag: usize) -> f64 {
    if lag == 0 {
        return 0.0;
    }
    DECAY_SCALE
        .mul_add((lag as f64).powf(DECAY_EXPONENT), -DECAY_OFFSET)
        .max(0.0)
}

/// Scores every panel row with its decay-weighted repeat-incident risk.
///
/// The decay table is computed once at construction; scoring a panel then
/// only reads it, so one engine can score any number of panels.
#[derive(Debug, Clone)]
pub struct RevictimizationRiskEngine {
    probability: f64,
    decay: Vec<f64>,
}

impl RevictimizationRiskEngine {
    /// Builds the engine for a history horizon of `max_lag` months and a
    /// base repeat probability.
    #[must_use]
    pub fn new(max_lag: usize, probability: f64) -> Self {
        let decay = (0..=max_lag).map(decay_weight).collect();
        Self { probability, decay }
    }

    /// Fills `revictimization_risk` for every row, scanning locations in
    /// parallel and leaving the input row order untouched.
    #[must_use]
    pub fn attach(&self, panel: Vec<PanelRow>) -> Vec<PanelRow> {
        info!("scoring revictimization risk over {} panel rows", panel.len());
        scan_partitions(panel, |rows| self.scan(rows))
    }

    /// One location's chronological rows. Months before the panel start
    /// contribute nothing, so early rows simply sum a shorter history.
    fn scan(&self, rows: &mut [PanelRow]) {
        let counts: Vec<f64> = rows
            .iter()
            .map(|row| f64::from(row.incident_count))
            .collect();
        for (t, row) in rows.iter_mut().enumerate() {
            let mut hazard = 0.0;
            for (lag, weight) in self.decay.iter().enumerate().skip(1) {
                let Some(back) = t.checked_sub(lag) else {
                    break;
                };
                hazard = counts[back].mul_add(*weight, hazard);
            }
            row.revictimization_risk = self.probability * hazard;
        }
    }
}
