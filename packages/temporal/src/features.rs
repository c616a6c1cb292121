//! The causal temporal feature engine.
//!
//! Every column this engine writes derives only from periods strictly
//! before the row's own: lags and rolling statistics read the shift-1
//! series, and smoothers run on the raw series but are shifted by one
//! before landing in a row. A forecaster reading any row therefore sees
//! only information that existed at prediction time.

use crime_panel_models::PanelRow;
use log::info;

use crate::partition::scan_partitions;
use crate::smoothing::{self, WeightCache, hma_windows};
use crate::window::{
    rolling_max, rolling_mean, rolling_min, rolling_std, safe_div, shift, shift_nullable, sub,
};

/// Hull windows materialized as panel columns.
const HULL_WINDOWS: [usize; 2] = [4, 5];

/// Computes the temporal feature block of the panel.
///
/// The engine owns the weight table its Hull smoothers draw from; build
/// it once and reuse it across panels.
#[derive(Debug, Clone)]
pub struct TemporalFeatureEngine {
    weights: WeightCache,
}

impl TemporalFeatureEngine {
    /// Upper bound on distinct weight ramps the engine stores.
    const WEIGHT_CAPACITY: usize = 8;

    #[must_use]
    pub fn new() -> Self {
        let mut weights = WeightCache::new(Self::WEIGHT_CAPACITY);
        for window in HULL_WINDOWS {
            for derived in hma_windows(window) {
                weights.warm(derived);
            }
        }
        Self { weights }
    }

    /// Fills the temporal columns of every row, scanning locations in
    /// parallel and leaving the input row order untouched.
    #[must_use]
    pub fn attach(&self, panel: Vec<PanelRow>) -> Vec<PanelRow> {
        info!("computing temporal features over {} panel rows", panel.len());
        scan_partitions(panel, |rows| self.scan(rows))
    }

    /// One location's chronological rows.
    fn scan(&self, rows: &mut [PanelRow]) {
        let counts: Vec<f64> = rows
            .iter()
            .map(|row| f64::from(row.incident_count))
            .collect();

        let lag_1 = shift(&counts, 1);
        let lag_3 = shift(&counts, 3);
        let lag_6 = shift(&counts, 6);
        let lag_12 = shift(&counts, 12);
        let same_month_2y = shift(&counts, 24);

        let roll_mean_3 = rolling_mean(&lag_1, 3);
        let roll_mean_6 = rolling_mean(&lag_1, 6);
        let roll_std_6 = rolling_std(&lag_1, 6);
        let roll_max_6 = rolling_max(&lag_1, 6);
        let roll_min_6 = rolling_min(&lag_1, 6);

        let ewma_6 = shift_clip(&present(smoothing::ewma(&counts, 6)));
        let ewma_12 = shift_clip(&present(smoothing::ewma(&counts, 12)));
        let hma_4 = shift_clip(&smoothing::hma(&counts, 4, &self.weights));
        let hma_5 = shift_clip(&smoothing::hma(&counts, 5, &self.weights));
        let tema_6 = shift_clip(&present(smoothing::tema(&counts, 6)));

        for (i, row) in rows.iter_mut().enumerate() {
            row.lag_1 = lag_1[i];
            row.lag_3 = lag_3[i];
            row.lag_6 = lag_6[i];
            row.lag_12 = lag_12[i];
            row.roll_mean_3 = roll_mean_3[i];
            row.roll_mean_6 = roll_mean_6[i];
            row.roll_std_6 = roll_std_6[i];
            row.roll_max_6 = roll_max_6[i];
            row.roll_min_6 = roll_min_6[i];
            row.same_month_last_year = lag_12[i];
            row.same_month_2y = same_month_2y[i];
            row.diff_3_6 = sub(lag_3[i], lag_6[i]);
            row.diff_3_12 = sub(lag_3[i], lag_12[i]);
            row.pct_change_3_6 = safe_div(sub(lag_3[i], lag_6[i]), lag_6[i]);
            row.pct_change_3_12 = safe_div(sub(lag_3[i], lag_12[i]), lag_12[i]);
            row.vs_seasonal = safe_div(lag_3[i], lag_12[i]);
            row.volatility_6 = safe_div(roll_std_6[i], roll_mean_6[i]);
            row.range_norm_6 = safe_div(sub(roll_max_6[i], roll_min_6[i]), roll_mean_6[i]);
            row.trend_ratio = safe_div(roll_mean_3[i], roll_mean_6[i]);
            row.ewma_6 = ewma_6[i];
            row.ewma_12 = ewma_12[i];
            row.hma_4 = hma_4[i];
            row.hma_5 = hma_5[i];
            row.tema_6 = tema_6[i];
        }
    }
}

impl Default for TemporalFeatureEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn present(series: Vec<f64>) -> Vec<Option<f64>> {
    series.into_iter().map(Some).collect()
}

/// Smoothers run on the raw series, one step ahead of what a forecaster
/// at t may use; align them causally and clip the Hull/TEMA overshoot.
fn shift_clip(series: &[Option<f64>]) -> Vec<Option<f64>> {
    shift_nullable(series, 1)
        .into_iter()
        .map(|value| value.map(|v| v.max(0.0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(location: &str, counts: &[u32]) -> Vec<PanelRow> {
        counts
            .iter()
            .enumerate()
            .map(|(i, count)| {
                let year = 2020 + i32::try_from(i / 12).unwrap();
                let month = u32::try_from(i % 12).unwrap() + 1;
                PanelRow {
                    location: location.to_string(),
                    year,
                    month,
                    incident_count: *count,
                    ..PanelRow::default()
                }
            })
            .collect()
    }

    #[test]
    fn lags_and_rolling_mean_follow_the_history() {
        let engine = TemporalFeatureEngine::new();
        let scanned = engine.attach(series("a", &[2, 0, 1, 3]));

        let april = &scanned[3];
        assert_eq!(april.lag_1, Some(1.0));
        assert_eq!(april.lag_3, Some(2.0));
        assert_eq!(april.roll_mean_3, Some(1.0));
        assert_eq!(april.lag_6, None);
        assert_eq!(april.lag_12, None);
        assert_eq!(april.diff_3_6, None);

        assert_eq!(scanned[1].lag_1, Some(2.0));
        assert_eq!(scanned[0].lag_1, None);
        assert_eq!(scanned[0].roll_mean_3, None);
    }

    #[test]
    fn truncating_the_future_leaves_the_past_unchanged() {
        let counts = [
            3, 0, 1, 4, 2, 5, 0, 0, 2, 1, 6, 3, 2, 4, 1, 0, 5, 2, 3, 1, 0, 2, 4, 6, 1, 3, 2, 0,
            1, 5,
        ];
        let engine = TemporalFeatureEngine::new();
        let full = engine.attach(series("a", &counts));
        let truncated = engine.attach(series("a", &counts[..20]));
        assert_eq!(full[..20], truncated[..]);
    }

    #[test]
    fn seasonal_anchors_reach_back_full_years() {
        let counts: Vec<u32> = (0..26).map(|i| (i * 7 + 3) % 11).collect();
        let engine = TemporalFeatureEngine::new();
        let scanned = engine.attach(series("a", &counts));

        let row = &scanned[24];
        assert_eq!(row.same_month_2y, Some(f64::from(counts[0])));
        assert_eq!(row.same_month_last_year, Some(f64::from(counts[12])));
        assert_eq!(row.lag_12, row.same_month_last_year);
        assert_eq!(row.vs_seasonal, safe_div(row.lag_3, row.lag_12));
    }

    #[test]
    fn smoothers_are_clipped_after_the_causal_shift() {
        let engine = TemporalFeatureEngine::new();
        let scanned = engine.attach(series("a", &[10, 10, 10, 10, 0, 0, 0, 0]));

        // The raw Hull average overshoots below zero right after the drop.
        assert_eq!(scanned[6].hma_4, Some(0.0));
        for row in &scanned {
            for value in [row.ewma_6, row.ewma_12, row.hma_4, row.hma_5, row.tema_6] {
                assert!(value.is_none_or(|v| v >= 0.0));
            }
        }
    }

    #[test]
    fn ewma_column_is_the_shifted_recursion() {
        let engine = TemporalFeatureEngine::new();
        let scanned = engine.attach(series("a", &[7, 0, 0]));
        // span 6 gives alpha 2/7: levels 7, then 7 - 2 = 5.
        assert_eq!(scanned[0].ewma_6, None);
        assert_eq!(scanned[1].ewma_6, Some(7.0));
        assert_eq!(scanned[2].ewma_6, Some(5.0));
    }

    #[test]
    fn all_zero_history_yields_null_ratios_not_infinities() {
        let engine = TemporalFeatureEngine::new();
        let scanned = engine.attach(series("a", &[0; 13]));

        let row = &scanned[12];
        assert_eq!(row.lag_6, Some(0.0));
        assert_eq!(row.roll_mean_3, Some(0.0));
        assert_eq!(row.roll_std_6, Some(0.0));
        assert_eq!(row.pct_change_3_6, None);
        assert_eq!(row.vs_seasonal, None);
        assert_eq!(row.volatility_6, None);
        assert_eq!(row.trend_ratio, None);
        assert_eq!(row.range_norm_6, None);
    }

    #[test]
    fn locations_are_scanned_independently_in_input_order() {
        let a = series("a", &[5, 0]);
        let b = series("b", &[9, 1]);
        let panel = vec![a[0].clone(), b[0].clone(), a[1].clone(), b[1].clone()];

        let engine = TemporalFeatureEngine::new();
        let scanned = engine.attach(panel);

        let locations: Vec<&str> = scanned.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(locations, ["a", "b", "a", "b"]);
        assert_eq!(scanned[2].lag_1, Some(5.0));
        assert_eq!(scanned[3].lag_1, Some(9.0));
    }

    #[test]
    fn constant_series_keeps_every_smoother_at_the_constant() {
        let engine = TemporalFeatureEngine::new();
        let scanned = engine.attach(series("a", &[3; 10]));

        let row = &scanned[9];
        for value in [row.ewma_6, row.ewma_12, row.hma_4, row.hma_5, row.tema_6] {
            assert!((value.unwrap() - 3.0).abs() < 1e-9);
        }
        assert_eq!(row.roll_mean_6, Some(3.0));
        assert_eq!(row.roll_std_6, Some(0.0));
        assert_eq!(row.trend_ratio, Some(1.0));
    }
}
