//! Population and density attachment with trend extrapolation.

use std::collections::BTreeMap;

use crime_panel_models::{DataQuality, DemographicObservation, PanelRow};

/// Per-location observed values keyed by year.
type YearValues = BTreeMap<i32, (f64, f64)>;

/// Attaches population and density to every panel row.
///
/// Years inside a location's observed range join directly; unobserved
/// in-range years stay null (gaps are never interpolated). Years
/// strictly outside the observed range are extrapolated along the
/// location's end-to-end linear trend, with populations rounded to
/// whole people and densities left fractional. Locations absent from
/// the source yield nulls throughout and are counted in `quality`.
#[must_use]
pub fn attach(
    mut panel: Vec<PanelRow>,
    observations: &[DemographicObservation],
    quality: &mut DataQuality,
) -> Vec<PanelRow> {
    let mut by_location: BTreeMap<&str, YearValues> = BTreeMap::new();
    for obs in observations {
        by_location
            .entry(obs.location.as_str())
            .or_default()
            .insert(obs.year, (obs.population, obs.density));
    }

    let mut resolved: BTreeMap<String, BTreeMap<i32, (f64, f64)>> = BTreeMap::new();
    let mut missing_count = 0usize;
    let mut extrapolated = 0usize;

    {
        let mut keys: Vec<(&str, i32)> = panel
            .iter()
            .map(|row| (row.location.as_str(), row.year))
            .collect();
        keys.sort_unstable();
        keys.dedup();

        let mut last_missing: Option<&str> = None;
        for (location, year) in keys {
            let Some(observed) = by_location.get(location) else {
                if last_missing != Some(location) {
                    missing_count += 1;
                    last_missing = Some(location);
                }
                continue;
            };
            let values = match lookup(observed, year) {
                Lookup::Observed(values) => values,
                Lookup::Extrapolated(values) => {
                    extrapolated += 1;
                    values
                }
                Lookup::Gap => continue,
            };
            resolved
                .entry(location.to_string())
                .or_default()
                .insert(year, values);
        }
    }

    for row in &mut panel {
        let values = resolved
            .get(row.location.as_str())
            .and_then(|years| years.get(&row.year));
        if let Some(&(population, density)) = values {
            row.population = Some(population);
            row.population_density = Some(density);
        }
    }

    if missing_count > 0 {
        log::warn!("population: {missing_count} locations absent from the source, left null");
    }
    if extrapolated > 0 {
        log::info!("population: {extrapolated} location-years filled by trend extrapolation");
    }
    quality.locations_missing_population += missing_count;
    quality.population_years_extrapolated += extrapolated;

    panel
}

enum Lookup {
    Observed((f64, f64)),
    Extrapolated((f64, f64)),
    Gap,
}

/// Resolves one (location, year) against the location's observed years.
fn lookup(observed: &YearValues, year: i32) -> Lookup {
    if let Some(&values) = observed.get(&year) {
        return Lookup::Observed(values);
    }

    let (Some((&first_year, &first)), Some((&last_year, &last))) =
        (observed.first_key_value(), observed.last_key_value())
    else {
        return Lookup::Gap;
    };

    if year > first_year && year < last_year {
        return Lookup::Gap;
    }

    Lookup::Extrapolated(extrapolate(year, first_year, first, last_year, last))
}

/// End-to-end linear trend through the first and last observations.
#[allow(clippy::cast_precision_loss)]
fn extrapolate(
    year: i32,
    first_year: i32,
    first: (f64, f64),
    last_year: i32,
    last: (f64, f64),
) -> (f64, f64) {
    let span = last_year - first_year;
    let (population_trend, density_trend) = if span == 0 {
        (0.0, 0.0)
    } else {
        (
            (last.0 - first.0) / f64::from(span),
            (last.1 - first.1) / f64::from(span),
        )
    };

    let offset = f64::from(year - last_year);
    let population = (last.0 + population_trend * offset).round();
    let density = last.1 + density_trend * offset;
    (population, density)
}
