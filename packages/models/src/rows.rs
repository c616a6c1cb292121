//! Row types for the panel and its auxiliary tables.
//!
//! [`PanelRow`] is the wide observation cell every stage fills in: the
//! grid completer creates it with the key, time encodings, and target
//! count; the joiners and engines populate the remaining columns. Feature
//! columns are `Option<f64>` so boundary rows without enough history stay
//! null instead of carrying fabricated values.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::period::Period;

/// One raw incident row as ingested, before period parsing.
///
/// The period is kept as the source's `"YYYY-MM"` string; the time
/// normalizer parses it exactly once. Sources without a count column
/// are read as one incident per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIncident {
    /// Location code.
    pub location: String,
    /// Raw `"YYYY-MM"` period string.
    pub period: String,
    /// Incident count, defaulted to 1 when the source has none.
    pub count: u32,
}

/// Static nearest-neighbor edge: `location`'s `rank`-th closest neighbor.
///
/// Each location carries exactly k edges with ranks 1..k ascending by
/// distance and no self-edges; the spatial engine validates this before
/// aggregating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborEdge {
    /// The location this edge belongs to.
    pub location: String,
    /// The neighboring location.
    pub neighbor: String,
    /// Distance between the two centroids, in the source projection's unit.
    pub distance: f64,
    /// 1-based closeness rank; rank 1 is the nearest neighbor.
    pub rank: u32,
}

/// One observed (location, year) population/density measurement, produced
/// by melting the wide-by-year source table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicObservation {
    /// Location code.
    pub location: String,
    /// Observation year.
    pub year: i32,
    /// Resident population estimate.
    pub population: f64,
    /// Population density (people per square km).
    pub density: f64,
}

/// Deprivation index snapshot epochs. Each epoch owns an immutable table
/// and a fixed band of panel years that join against it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DeprivationEpoch {
    /// 2010 snapshot, joined for panel years up to and including 2014.
    Imd2010,
    /// 2015 snapshot, joined for panel years 2015-2018.
    Imd2015,
    /// 2019 snapshot, joined for panel years 2019 onwards.
    Imd2019,
}

impl DeprivationEpoch {
    /// All epochs in band order.
    pub const ALL: &'static [Self] = &[Self::Imd2010, Self::Imd2015, Self::Imd2019];

    /// Returns the epoch whose year band contains `year`.
    ///
    /// The first band is open at the bottom so that every panel year maps
    /// to exactly one epoch and no row is ever dropped.
    #[must_use]
    pub const fn for_year(year: i32) -> Self {
        match year {
            i32::MIN..=2014 => Self::Imd2010,
            2015..=2018 => Self::Imd2015,
            _ => Self::Imd2019,
        }
    }
}

/// One location's deprivation sub-scores within a single epoch table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeprivationRecord {
    /// Location code.
    pub location: String,
    /// Overall index of multiple deprivation score.
    pub imd_score: f64,
    /// Income deprivation sub-score.
    pub income_score: f64,
    /// Employment deprivation sub-score.
    pub employment_score: f64,
    /// Education, skills and training sub-score.
    pub education_score: f64,
    /// Health deprivation and disability sub-score.
    pub health_score: f64,
    /// Crime sub-score.
    pub crime_score: f64,
    /// Barriers to housing and services sub-score.
    pub housing_barriers_score: f64,
    /// Living environment sub-score.
    pub living_env_score: f64,
}

/// Static property-type composition of a location's housing stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingProfile {
    /// Location code.
    pub location: String,
    /// Fraction of detached properties.
    pub detached: f64,
    /// Fraction of semi-detached properties.
    pub semi_detached: f64,
    /// Fraction of terraced properties.
    pub terraced: f64,
    /// Fraction of flats, maisonettes and apartments.
    pub flat: f64,
    /// Fraction of other property types (caravans, shared dwellings).
    pub other: f64,
}

/// Projected centroid of a location, input to the neighbor-edge builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    /// Location code.
    pub location: String,
    /// Easting in the source projection (meters).
    pub x: f64,
    /// Northing in the source projection (meters).
    pub y: f64,
}

/// Residential-dominance classification used by the optional panel filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentialClass {
    /// Location code.
    pub location: String,
    /// Whether the location's land use is residential-dominant.
    pub is_residential_dominant: bool,
}

/// Data-quality counters accumulated while joining auxiliary tables.
///
/// Recoverable gaps (a location absent from a source) are filled per the
/// pipeline's explicit rules, counted here, and surfaced in the run
/// manifest; they never abort the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    /// Locations with no population/density observations at all.
    pub locations_missing_population: usize,
    /// Location-years filled by linear-trend extrapolation.
    pub population_years_extrapolated: usize,
    /// Locations absent from at least one joined deprivation snapshot.
    pub locations_missing_deprivation: usize,
    /// Locations absent from the housing source (fractions zero-filled).
    pub locations_missing_housing: usize,
    /// Neighbor edges whose target location is not in the panel.
    pub edges_outside_panel: usize,
}

/// One observation cell of the dense panel: a (location, period) key, the
/// target count, and every engineered column.
///
/// The grid completer emits rows with only the key block and target
/// populated; each later stage fills its own block and leaves the rest
/// untouched. Serialization order matches field order, which is the
/// column order of the exported feature table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelRow {
    /// Location code.
    pub location: String,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Cyclic sine encoding of the month.
    pub month_sin: f64,
    /// Cyclic cosine encoding of the month.
    pub month_cos: f64,
    /// Linear time index normalized to [0, 1] over the observed range.
    pub time_index_norm: f64,
    /// Extended-holiday month flag.
    pub holiday_month: bool,
    /// Target: incident count for this cell, zero-filled when absent.
    pub incident_count: u32,

    // Demographics (null when the location is absent from the source and
    // the year is inside the observed range).
    /// Resident population, observed or trend-extrapolated.
    pub population: Option<f64>,
    /// Population density, observed or trend-extrapolated.
    pub population_density: Option<f64>,

    // Deprivation snapshot of the year's epoch.
    /// Overall deprivation score.
    pub imd_score: Option<f64>,
    /// Income sub-score.
    pub income_score: Option<f64>,
    /// Employment sub-score.
    pub employment_score: Option<f64>,
    /// Education sub-score.
    pub education_score: Option<f64>,
    /// Health sub-score.
    pub health_score: Option<f64>,
    /// Crime sub-score.
    pub crime_score: Option<f64>,
    /// Housing-barriers sub-score.
    pub housing_barriers_score: Option<f64>,
    /// Living-environment sub-score.
    pub living_env_score: Option<f64>,

    // Housing composition, zero-filled with an explicit missingness flag.
    /// Fraction of detached properties.
    pub frac_detached: f64,
    /// Fraction of semi-detached properties.
    pub frac_semi_detached: f64,
    /// Fraction of terraced properties.
    pub frac_terraced: f64,
    /// Fraction of flats.
    pub frac_flat: f64,
    /// Fraction of other property types.
    pub frac_other: f64,
    /// True when the location was absent from the housing source, so the
    /// zero fractions are fill-ins rather than observed zeros.
    pub housing_missing: bool,

    // Same-period neighbor aggregates (null-propagating).
    /// Mean of the k neighbors' counts this period.
    pub neighbor_count_avg: Option<f64>,
    /// Max of the k neighbors' counts this period.
    pub neighbor_count_max: Option<f64>,
    /// Sample std of the k neighbors' counts this period.
    pub neighbor_count_std: Option<f64>,
    /// Inverse-distance-weighted average of the k neighbors' counts.
    pub neighbor_count_weighted_avg: Option<f64>,
    /// The rank-1 (closest) neighbor's count this period.
    pub closest_neighbor_count: Option<f64>,

    // Causal temporal features; null until enough history accumulates.
    /// Count one month back.
    #[serde(rename = "incident_count_lag_1")]
    pub lag_1: Option<f64>,
    /// Count three months back.
    #[serde(rename = "incident_count_lag_3")]
    pub lag_3: Option<f64>,
    /// Count six months back.
    #[serde(rename = "incident_count_lag_6")]
    pub lag_6: Option<f64>,
    /// Count twelve months back.
    #[serde(rename = "incident_count_lag_12")]
    pub lag_12: Option<f64>,
    /// 3-month rolling mean of the shift-1 series.
    #[serde(rename = "incident_count_roll_mean_3")]
    pub roll_mean_3: Option<f64>,
    /// 6-month rolling mean of the shift-1 series.
    #[serde(rename = "incident_count_roll_mean_6")]
    pub roll_mean_6: Option<f64>,
    /// 6-month rolling sample std of the shift-1 series.
    #[serde(rename = "incident_count_roll_std_6")]
    pub roll_std_6: Option<f64>,
    /// 6-month rolling max of the shift-1 series.
    #[serde(rename = "incident_count_roll_max_6")]
    pub roll_max_6: Option<f64>,
    /// 6-month rolling min of the shift-1 series.
    #[serde(rename = "incident_count_roll_min_6")]
    pub roll_min_6: Option<f64>,
    /// Seasonal anchor: count in the same month last year.
    #[serde(rename = "incident_count_same_month_last_year")]
    pub same_month_last_year: Option<f64>,
    /// Seasonal anchor: count in the same month two years ago.
    #[serde(rename = "incident_count_same_month_2_years_ago")]
    pub same_month_2y: Option<f64>,
    /// Difference between the 3- and 6-month lags.
    #[serde(rename = "incident_count_diff_3m_6m")]
    pub diff_3_6: Option<f64>,
    /// Difference between the 3- and 12-month lags.
    #[serde(rename = "incident_count_diff_3m_12m")]
    pub diff_3_12: Option<f64>,
    /// Percentage change from the 6- to the 3-month lag.
    #[serde(rename = "incident_count_pct_change_3m_6m")]
    pub pct_change_3_6: Option<f64>,
    /// Percentage change from the 12- to the 3-month lag.
    #[serde(rename = "incident_count_pct_change_3m_12m")]
    pub pct_change_3_12: Option<f64>,
    /// 3-month lag relative to the same month last year.
    #[serde(rename = "incident_count_vs_seasonal")]
    pub vs_seasonal: Option<f64>,
    /// Rolling std over rolling mean of the shift-1 series.
    #[serde(rename = "incident_count_volatility_6m")]
    pub volatility_6: Option<f64>,
    /// Rolling (max - min) over rolling mean of the shift-1 series.
    #[serde(rename = "incident_count_range_norm_6m")]
    pub range_norm_6: Option<f64>,
    /// Short rolling mean over long rolling mean of the shift-1 series.
    #[serde(rename = "incident_count_trend_ratio")]
    pub trend_ratio: Option<f64>,
    /// Span-6 exponentially weighted mean, shifted by one.
    #[serde(rename = "incident_count_ewma_6")]
    pub ewma_6: Option<f64>,
    /// Span-12 exponentially weighted mean, shifted by one.
    #[serde(rename = "incident_count_ewma_12")]
    pub ewma_12: Option<f64>,
    /// Window-4 Hull moving average, shifted by one, clipped to >= 0.
    #[serde(rename = "incident_count_hma_4")]
    pub hma_4: Option<f64>,
    /// Window-5 Hull moving average, shifted by one, clipped to >= 0.
    #[serde(rename = "incident_count_hma_5")]
    pub hma_5: Option<f64>,
    /// Span-6 triple exponential moving average, shifted by one, clipped.
    #[serde(rename = "incident_count_tema_6")]
    pub tema_6: Option<f64>,

    /// Decay-weighted near-repeat risk score.
    pub revictimization_risk: f64,
}

impl PanelRow {
    /// The period key of this row.
    #[must_use]
    pub const fn period(&self) -> Period {
        Period {
            year: self.year,
            month: self.month,
        }
    }
}
