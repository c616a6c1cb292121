//! Chronological train/test split.
//!
//! The cut runs along the period axis: every row of a period lands on the
//! same side, so training never sees any row of a test period. Cutting by
//! raw row position instead would put early locations' rows of a boundary
//! period into training and late locations' rows into test, leaking that
//! period across the split.

use std::collections::BTreeSet;

use crime_panel_models::{PanelRow, Period};
use log::info;

/// A panel partitioned into past (train) and future (test) periods.
#[derive(Debug, Clone)]
pub struct ChronologicalSplit {
    /// Rows of the training periods, in input order.
    pub train: Vec<PanelRow>,
    /// Rows of the test periods, in input order.
    pub test: Vec<PanelRow>,
    /// First test period; `None` when every period trains.
    pub boundary: Option<Period>,
}

/// Splits `rows` so the earliest `train_fraction` of distinct periods
/// (rounded down) trains and the rest tests.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn chronological_split(rows: Vec<PanelRow>, train_fraction: f64) -> ChronologicalSplit {
    let periods: BTreeSet<Period> = rows.iter().map(PanelRow::period).collect();
    let cut = (periods.len() as f64 * train_fraction).floor() as usize;
    let boundary = periods.iter().nth(cut).copied();

    let (train, test): (Vec<PanelRow>, Vec<PanelRow>) = match boundary {
        Some(boundary) => rows.into_iter().partition(|row| row.period() < boundary),
        None => (rows, Vec::new()),
    };
    info!(
        "chronological split: {} train rows, {} test rows over {} periods",
        train.len(),
        test.len(),
        periods.len()
    );
    ChronologicalSplit {
        train,
        test,
        boundary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month_rows(location: &str, months: u32) -> Vec<PanelRow> {
        (1..=months)
            .map(|month| PanelRow {
                location: location.to_string(),
                year: 2020 + i32::try_from((month - 1) / 12).unwrap(),
                month: (month - 1) % 12 + 1,
                ..PanelRow::default()
            })
            .collect()
    }

    #[test]
    fn seven_of_ten_periods_train() {
        let split = chronological_split(month_rows("a", 10), 0.7);
        assert_eq!(split.train.len(), 7);
        assert_eq!(split.test.len(), 3);
        assert_eq!(
            split.boundary,
            Some(Period {
                year: 2020,
                month: 8
            })
        );
    }

    #[test]
    fn fractional_period_counts_round_down() {
        let split = chronological_split(month_rows("a", 13), 0.7);
        let train_periods: BTreeSet<Period> =
            split.train.iter().map(PanelRow::period).collect();
        assert_eq!(train_periods.len(), 9);
    }

    #[test]
    fn no_period_straddles_the_cut() {
        let mut rows = month_rows("a", 9);
        rows.extend(month_rows("b", 9));
        let split = chronological_split(rows, 0.7);

        let train_periods: BTreeSet<Period> =
            split.train.iter().map(PanelRow::period).collect();
        let test_periods: BTreeSet<Period> =
            split.test.iter().map(PanelRow::period).collect();
        assert!(train_periods.intersection(&test_periods).next().is_none());
        assert!(train_periods.iter().max() < test_periods.iter().min());
    }

    #[test]
    fn single_period_panel_tests_entirely() {
        let split = chronological_split(month_rows("a", 1), 0.7);
        assert!(split.train.is_empty());
        assert_eq!(split.test.len(), 1);
        assert_eq!(
            split.boundary,
            Some(Period {
                year: 2020,
                month: 1
            })
        );
    }

    #[test]
    fn empty_panel_splits_into_empty_sides() {
        let split = chronological_split(Vec::new(), 0.7);
        assert!(split.train.is_empty());
        assert!(split.test.is_empty());
        assert!(split.boundary.is_none());
    }

    #[test]
    fn row_order_inside_each_side_follows_the_input() {
        let mut rows = Vec::new();
        for month in 1..=4 {
            for location in ["b", "a"] {
                rows.push(PanelRow {
                    location: location.to_string(),
                    year: 2020,
                    month,
                    ..PanelRow::default()
                });
            }
        }
        let split = chronological_split(rows, 0.5);

        let train_keys: Vec<(String, u32)> = split
            .train
            .iter()
            .map(|row| (row.location.clone(), row.month))
            .collect();
        assert_eq!(
            train_keys,
            [
                ("b".to_string(), 1),
                ("a".to_string(), 1),
                ("b".to_string(), 2),
                ("a".to_string(), 2),
            ]
        );
    }
}
