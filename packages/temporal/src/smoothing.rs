//! Weighted and exponential smoothers over per-location count series.
//!
//! The weighted family (WMA, HMA) yields `None` while its windows warm up;
//! the exponential family (EWMA, TEMA) is defined from the first
//! observation, so it returns a dense series and the caller decides how to
//! align it.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::window::rolling_apply;

/// Bounded memo table of linear weight ramps keyed by window length.
///
/// The owning engine warms the table with every window it will need, then
/// shares it read-only across worker threads. A lookup for an unwarmed
/// window recomputes the ramp without storing it, so the table never grows
/// past its capacity.
#[derive(Debug, Clone)]
pub struct WeightCache {
    capacity: usize,
    ramps: BTreeMap<usize, Arc<[f64]>>,
}

impl WeightCache {
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ramps: BTreeMap::new(),
        }
    }

    /// Precomputes and stores the ramp for `window`. Once the table holds
    /// `capacity` ramps further windows are left to the pure fallback.
    pub fn warm(&mut self, window: usize) {
        if window == 0 || self.ramps.contains_key(&window) {
            return;
        }
        if self.ramps.len() >= self.capacity {
            debug!("weight table full at {} ramps, window {window} stays uncached", self.ramps.len());
            return;
        }
        self.ramps.insert(window, linear_weights(window));
    }

    /// The weight ramp for `window`, shared when warmed, fresh otherwise.
    #[must_use]
    pub fn weights(&self, window: usize) -> Arc<[f64]> {
        self.ramps
            .get(&window)
            .map_or_else(|| linear_weights(window), Arc::clone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ramps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ramps.is_empty()
    }
}

/// Weighted moving average with linearly increasing weights `1..=window`,
/// so the newest value in each window counts most. Warm-up positions
/// without a full window yield `None`.
#[must_use]
pub fn wma(series: &[f64], window: usize, cache: &WeightCache) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = series.iter().copied().map(Some).collect();
    wma_nullable(&values, window, cache)
}

/// Hull moving average: a length-`round(sqrt(window))` WMA over the series
/// `2·WMA(window/2) − WMA(window)`, which trades a little overshoot for
/// much less lag. Overshoot means the output can dip below the input's
/// minimum, including below zero for count series.
#[must_use]
pub fn hma(series: &[f64], window: usize, cache: &WeightCache) -> Vec<Option<f64>> {
    let [half, full, outer] = hma_windows(window);
    let short = wma(series, half, cache);
    let long = wma(series, full, cache);
    let delta: Vec<Option<f64>> = short
        .iter()
        .zip(&long)
        .map(|(s, l)| s.zip(*l).map(|(s, l)| 2.0f64.mul_add(s, -l)))
        .collect();
    wma_nullable(&delta, outer, cache)
}

/// The three window lengths an HMA of `window` runs through, in use order:
/// the half ramp, the full ramp, and the final square-root ramp.
#[must_use]
pub fn hma_windows(window: usize) -> [usize; 3] {
    [(window / 2).max(1), window, sqrt_window(window)]
}

/// Exponentially weighted moving average in the recursive non-adjusted
/// form: `α = 2/(span+1)`, seeded from the first observation, so the
/// output is dense from position zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ewma(series: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(series.len());
    let mut level: Option<f64> = None;
    for value in series {
        let next = match level {
            None => *value,
            Some(prev) => alpha.mul_add(value - prev, prev),
        };
        out.push(next);
        level = Some(next);
    }
    out
}

/// Triple exponential moving average `3·e1 − 3·e2 + e3` over chained
/// EWMAs, which cancels most of the lag a single EWMA carries. Like
/// [`hma`], the lag correction can overshoot below zero on sharp drops.
#[must_use]
pub fn tema(series: &[f64], span: usize) -> Vec<f64> {
    let e1 = ewma(series, span);
    let e2 = ewma(&e1, span);
    let e3 = ewma(&e2, span);
    e1.iter()
        .zip(&e2)
        .zip(&e3)
        .map(|((a, b), c)| 3.0f64.mul_add(a - b, *c))
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn linear_weights(window: usize) -> Arc<[f64]> {
    (1..=window).map(|w| w as f64).collect()
}

fn wma_nullable(series: &[Option<f64>], window: usize, cache: &WeightCache) -> Vec<Option<f64>> {
    let weights = cache.weights(window);
    let total: f64 = weights.iter().sum();
    rolling_apply(series, window, |values| {
        let weighted: f64 = values.iter().zip(weights.iter()).map(|(v, w)| v * w).sum();
        weighted / total
    })
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn sqrt_window(window: usize) -> usize {
    ((window as f64).sqrt().round() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_ramps_are_linear() {
        let cache = WeightCache::new(4);
        assert_eq!(cache.weights(3).as_ref(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn warm_table_stops_growing_at_capacity() {
        let mut cache = WeightCache::new(1);
        cache.warm(3);
        cache.warm(4);
        assert_eq!(cache.len(), 1);
        // Uncached windows still resolve through the pure fallback.
        assert_eq!(cache.weights(4).as_ref(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn warming_the_same_window_twice_stores_one_ramp() {
        let mut cache = WeightCache::new(4);
        cache.warm(5);
        cache.warm(5);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn wma_of_constant_series_is_constant() {
        let cache = WeightCache::new(4);
        let smoothed = wma(&[5.0; 6], 3, &cache);
        assert_eq!(smoothed[0], None);
        assert_eq!(smoothed[1], None);
        for value in smoothed.into_iter().skip(2) {
            assert!((value.unwrap() - 5.0).abs() < 1e-12);
        }
    }

    #[test]
    fn wma_weights_favor_recent_values() {
        let cache = WeightCache::new(4);
        let smoothed = wma(&[1.0, 2.0, 3.0], 3, &cache);
        // (1·1 + 2·2 + 3·3) / 6
        assert!((smoothed[2].unwrap() - 14.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn hma_windows_derive_half_and_sqrt() {
        assert_eq!(hma_windows(4), [2, 4, 2]);
        assert_eq!(hma_windows(5), [2, 5, 2]);
        assert_eq!(hma_windows(9), [4, 9, 3]);
        assert_eq!(hma_windows(1), [1, 1, 1]);
    }

    #[test]
    fn hma_tracks_a_linear_series_without_lag() {
        let cache = WeightCache::new(4);
        let series: Vec<f64> = (0..8).map(f64::from).collect();
        let smoothed = hma(&series, 4, &cache);
        // Warm-up spans the full window plus the outer window.
        assert!(smoothed[3].is_none());
        for (i, value) in smoothed.iter().enumerate().skip(4) {
            assert!((value.unwrap() - series[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn hma_overshoots_below_zero_on_sharp_drops() {
        let cache = WeightCache::new(4);
        let series = [10.0, 10.0, 10.0, 10.0, 0.0, 0.0, 0.0, 0.0];
        let smoothed = hma(&series, 4, &cache);
        assert!(smoothed[5].is_some_and(|v| v < 0.0));
    }

    #[test]
    fn ewma_seeds_from_the_first_value() {
        // span 3 gives alpha 1/2: 2, then 2 + 0.5·(4 − 2).
        assert_eq!(ewma(&[2.0, 4.0], 3), vec![2.0, 3.0]);
    }

    #[test]
    fn ewma_of_constant_series_is_constant() {
        let smoothed = ewma(&[3.0; 5], 6);
        for value in smoothed {
            assert!((value - 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn tema_of_constant_series_is_constant() {
        let smoothed = tema(&[7.0; 6], 6);
        for value in smoothed {
            assert!((value - 7.0).abs() < 1e-12);
        }
    }

    #[test]
    fn tema_is_dense_like_its_input() {
        assert_eq!(tema(&[1.0, 2.0, 3.0], 6).len(), 3);
    }
}
