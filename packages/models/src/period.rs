//! Calendar period key and its derived encodings.
//!
//! A [`Period`] is one calendar month, the temporal granularity of the
//! panel. Periods parse from `"YYYY-MM"` strings and order
//! chronologically, which makes them usable as sort keys directly.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Months treated as extended-holiday months (Easter, summer, half term,
/// Christmas), following the England and Wales school calendar.
pub const HOLIDAY_MONTHS: [u32; 5] = [4, 7, 8, 10, 12];

/// Returns whether a calendar month falls in an extended-holiday period.
#[must_use]
pub const fn is_holiday_month(month: u32) -> bool {
    matches!(month, 4 | 7 | 8 | 10 | 12)
}

/// One calendar month of the panel, e.g. `2021-03`.
///
/// Field order gives the derived `Ord` chronological meaning: years
/// compare first, then months.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Period {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
}

impl Period {
    /// Parses a `"YYYY-MM"` period string.
    ///
    /// # Errors
    ///
    /// Returns [`PeriodParseError`] if the string is not two dash-separated
    /// integer fields or the month is outside 1-12.
    pub fn parse(input: &str) -> Result<Self, PeriodParseError> {
        let malformed = || PeriodParseError::Malformed {
            input: input.to_string(),
        };

        let (year_str, month_str) = input.trim().split_once('-').ok_or_else(malformed)?;
        let year: i32 = year_str.parse().map_err(|_| malformed())?;
        let month: u32 = month_str.parse().map_err(|_| malformed())?;

        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::MonthOutOfRange {
                input: input.to_string(),
                month,
            });
        }

        Ok(Self { year, month })
    }

    /// Zero-based month count since January of `year_min`.
    #[must_use]
    pub fn linear_index(self, year_min: i32) -> i64 {
        i64::from(self.year - year_min) * 12 + i64::from(self.month - 1)
    }

    /// Cyclic sine encoding of the month, `sin((month - 1) * pi / 6)`.
    #[must_use]
    pub fn month_sin(self) -> f64 {
        (f64::from(self.month - 1) * (PI / 6.0)).sin()
    }

    /// Cyclic cosine encoding of the month, `cos((month - 1) * pi / 6)`.
    #[must_use]
    pub fn month_cos(self) -> f64 {
        (f64::from(self.month - 1) * (PI / 6.0)).cos()
    }

    /// Whether this period falls in an extended-holiday month.
    #[must_use]
    pub const fn is_holiday(self) -> bool {
        is_holiday_month(self.month)
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error returned when a period string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    /// The string was not of the form `"YYYY-MM"`.
    Malformed {
        /// The rejected input.
        input: String,
    },
    /// The month field parsed but is outside 1-12.
    MonthOutOfRange {
        /// The rejected input.
        input: String,
        /// The out-of-range month value.
        month: u32,
    },
}

impl std::fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { input } => {
                write!(f, "malformed period string {input:?}: expected YYYY-MM")
            }
            Self::MonthOutOfRange { input, month } => {
                write!(f, "period {input:?} has month {month}: expected 1-12")
            }
        }
    }
}

impl std::error::Error for PeriodParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_padded_period() {
        assert_eq!(
            Period::parse("2021-03").unwrap(),
            Period {
                year: 2021,
                month: 3
            }
        );
    }

    #[test]
    fn parses_unpadded_month() {
        assert_eq!(
            Period::parse("2021-3").unwrap(),
            Period {
                year: 2021,
                month: 3
            }
        );
    }

    #[test]
    fn rejects_missing_dash() {
        assert!(matches!(
            Period::parse("202103"),
            Err(PeriodParseError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_non_numeric_fields() {
        assert!(matches!(
            Period::parse("2021-xx"),
            Err(PeriodParseError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_month_thirteen() {
        assert!(matches!(
            Period::parse("2021-13"),
            Err(PeriodParseError::MonthOutOfRange { month: 13, .. })
        ));
    }

    #[test]
    fn rejects_month_zero() {
        assert!(matches!(
            Period::parse("2021-00"),
            Err(PeriodParseError::MonthOutOfRange { month: 0, .. })
        ));
    }

    #[test]
    fn orders_chronologically() {
        let dec_2020 = Period::parse("2020-12").unwrap();
        let jan_2021 = Period::parse("2021-01").unwrap();
        let feb_2021 = Period::parse("2021-02").unwrap();
        assert!(dec_2020 < jan_2021);
        assert!(jan_2021 < feb_2021);
    }

    #[test]
    fn linear_index_spans_year_boundary() {
        let jan = Period {
            year: 2020,
            month: 1,
        };
        let feb_next = Period {
            year: 2021,
            month: 2,
        };
        assert_eq!(jan.linear_index(2020), 0);
        assert_eq!(feb_next.linear_index(2020), 13);
    }

    #[test]
    fn cyclic_encodings_match_known_months() {
        let jan = Period {
            year: 2021,
            month: 1,
        };
        let apr = Period {
            year: 2021,
            month: 4,
        };
        assert!((jan.month_sin() - 0.0).abs() < 1e-12);
        assert!((jan.month_cos() - 1.0).abs() < 1e-12);
        // April is a quarter turn: sin == 1, cos == 0.
        assert!((apr.month_sin() - 1.0).abs() < 1e-12);
        assert!(apr.month_cos().abs() < 1e-12);
    }

    #[test]
    fn holiday_months_match_flag_set() {
        let flagged: Vec<u32> = (1..=12).filter(|&m| is_holiday_month(m)).collect();
        assert_eq!(flagged, HOLIDAY_MONTHS.to_vec());
    }

    #[test]
    fn displays_zero_padded() {
        let p = Period {
            year: 2021,
            month: 3,
        };
        assert_eq!(p.to_string(), "2021-03");
    }
}
