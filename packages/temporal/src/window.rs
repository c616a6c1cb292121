//! Shift and rolling-window primitives over nullable series.
//!
//! Every operation here is causal-friendly: a position that lacks a full
//! window of present values yields `None` rather than a padded or partial
//! statistic, so warm-up rows stay null all the way to the exported table.

/// Shifts `series` down by `steps`: position `i` holds the value observed
/// `steps` positions earlier. The first `steps` positions have no history
/// and come back as `None`.
#[must_use]
pub fn shift(series: &[f64], steps: usize) -> Vec<Option<f64>> {
    (0..series.len())
        .map(|i| i.checked_sub(steps).map(|j| series[j]))
        .collect()
}

/// [`shift`] for series that already contain nulls.
#[must_use]
pub fn shift_nullable(series: &[Option<f64>], steps: usize) -> Vec<Option<f64>> {
    (0..series.len())
        .map(|i| i.checked_sub(steps).and_then(|j| series[j]))
        .collect()
}

/// Applies `f` to every full window of `window` consecutive values. A
/// position whose window reaches past the start of the series, or whose
/// window contains a null, yields `None`.
pub fn rolling_apply(
    series: &[Option<f64>],
    window: usize,
    f: impl Fn(&[f64]) -> f64,
) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; series.len()];
    }
    (0..series.len())
        .map(|i| {
            let start = i.checked_sub(window - 1)?;
            let values = series[start..=i]
                .iter()
                .copied()
                .collect::<Option<Vec<f64>>>()?;
            Some(f(&values))
        })
        .collect()
}

/// Rolling arithmetic mean over full windows.
#[must_use]
pub fn rolling_mean(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_apply(series, window, mean)
}

/// Rolling sample standard deviation over full windows. Windows shorter
/// than two values have no spread, so `window < 2` yields all nulls.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rolling_std(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; series.len()];
    }
    rolling_apply(series, window, |values| {
        let center = mean(values);
        let sum_sq: f64 = values.iter().map(|v| (v - center).powi(2)).sum();
        (sum_sq / (values.len() - 1) as f64).sqrt()
    })
}

/// Rolling maximum over full windows.
#[must_use]
pub fn rolling_max(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_apply(series, window, |values| {
        values.iter().copied().fold(f64::MIN, f64::max)
    })
}

/// Rolling minimum over full windows.
#[must_use]
pub fn rolling_min(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling_apply(series, window, |values| {
        values.iter().copied().fold(f64::MAX, f64::min)
    })
}

/// Divides `numerator` by `denominator`, treating a missing operand or a
/// zero denominator as undefined rather than producing an infinity.
#[must_use]
pub fn safe_div(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

/// Subtracts `b` from `a` when both are present.
#[must_use]
pub fn sub(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
