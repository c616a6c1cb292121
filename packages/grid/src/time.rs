//! Period parsing and derived time columns.

use std::collections::{BTreeMap, BTreeSet};

use crime_panel_models::{Period, RawIncident};

use crate::GridError;

/// An incident row with its period parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedIncident {
    /// Location code.
    pub location: String,
    /// Parsed period.
    pub period: Period,
    /// Incident count.
    pub count: u32,
}

/// Derived time columns of one distinct period.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodContext {
    /// The period itself.
    pub period: Period,
    /// Cyclic sine encoding of the month.
    pub month_sin: f64,
    /// Cyclic cosine encoding of the month.
    pub month_cos: f64,
    /// Position in [0, 1] along the observed period range.
    pub time_index_norm: f64,
    /// Extended-holiday month flag.
    pub holiday_month: bool,
}

/// The normalized incident list plus the distinct-period table.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Incident rows with parsed periods, in input order.
    pub incidents: Vec<NormalizedIncident>,
    /// Distinct periods ascending, with derived columns computed once.
    pub periods: Vec<PeriodContext>,
}

/// Parses raw period strings and derives the per-period time columns.
///
/// Each distinct raw string is parsed once; repeats hit a lookup table.
/// The normalized range spans the observed periods: the earliest maps to
/// 0, the latest to 1, and a single-period dataset collapses to 0.
///
/// # Errors
///
/// Returns an error on the first malformed period string.
#[allow(clippy::cast_precision_loss)]
pub fn normalize(raw: &[RawIncident]) -> Result<Normalized, GridError> {
    let mut parsed: BTreeMap<&str, Period> = BTreeMap::new();
    let mut incidents = Vec::with_capacity(raw.len());

    for row in raw {
        let period = match parsed.get(row.period.as_str()) {
            Some(period) => *period,
            None => {
                let period = Period::parse(&row.period)?;
                parsed.insert(&row.period, period);
                period
            }
        };
        incidents.push(NormalizedIncident {
            location: row.location.clone(),
            period,
            count: row.count,
        });
    }

    let distinct: BTreeSet<Period> = incidents.iter().map(|i| i.period).collect();
    let periods = match (distinct.first(), distinct.last()) {
        (Some(&first), Some(&last)) => {
            let year_min = first.year;
            let min_index = first.linear_index(year_min);
            let span = (last.linear_index(year_min) - min_index).max(1);

            distinct
                .iter()
                .map(|&period| PeriodContext {
                    period,
                    month_sin: period.month_sin(),
                    month_cos: period.month_cos(),
                    time_index_norm: (period.linear_index(year_min) - min_index) as f64
                        / span as f64,
                    holiday_month: period.is_holiday(),
                })
                .collect()
        }
        _ => {
            log::warn!("no incident rows; the panel will be empty");
            Vec::new()
        }
    };

    log::debug!(
        "normalized {} incident rows across {} distinct periods",
        incidents.len(),
        periods.len()
    );

    Ok(Normalized { incidents, periods })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(location: &str, period: &str, count: u32) -> RawIncident {
        RawIncident {
            location: location.to_string(),
            period: period.to_string(),
            count,
        }
    }

    #[test]
    fn derives_one_context_per_distinct_period() {
        let rows = vec![
            raw("A", "2020-01", 1),
            raw("B", "2020-01", 2),
            raw("A", "2020-03", 1),
        ];
        let normalized = normalize(&rows).unwrap();
        assert_eq!(normalized.incidents.len(), 3);
        assert_eq!(normalized.periods.len(), 2);
        assert_eq!(normalized.periods[0].period, Period { year: 2020, month: 1 });
    }

    #[test]
    fn time_index_norm_is_linear_in_months() {
        let rows = vec![
            raw("A", "2020-01", 1),
            raw("A", "2020-02", 1),
            raw("A", "2020-04", 1),
        ];
        let normalized = normalize(&rows).unwrap();
        let norms: Vec<f64> = normalized
            .periods
            .iter()
            .map(|p| p.time_index_norm)
            .collect();
        assert!((norms[0] - 0.0).abs() < 1e-12);
        assert!((norms[1] - 1.0 / 3.0).abs() < 1e-12);
        assert!((norms[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn single_period_dataset_collapses_to_zero() {
        let rows = vec![raw("A", "2020-06", 1), raw("B", "2020-06", 1)];
        let normalized = normalize(&rows).unwrap();
        assert_eq!(normalized.periods.len(), 1);
        assert!((normalized.periods[0].time_index_norm - 0.0).abs() < 1e-12);
    }

    #[test]
    fn range_spans_year_boundaries() {
        let rows = vec![raw("A", "2019-11", 1), raw("A", "2020-02", 1)];
        let normalized = normalize(&rows).unwrap();
        let last = normalized.periods.last().unwrap();
        assert!((last.time_index_norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flags_holiday_periods() {
        let rows = vec![raw("A", "2020-07", 1), raw("A", "2020-09", 1)];
        let normalized = normalize(&rows).unwrap();
        assert!(normalized.periods[0].holiday_month);
        assert!(!normalized.periods[1].holiday_month);
    }

    #[test]
    fn propagates_parse_errors() {
        let rows = vec![raw("A", "2020/01", 1)];
        assert!(matches!(normalize(&rows), Err(GridError::Period(_))));
    }

    #[test]
    fn empty_input_yields_empty_tables() {
        let normalized = normalize(&[]).unwrap();
        assert!(normalized.incidents.is_empty());
        assert!(normalized.periods.is_empty());
    }
}
