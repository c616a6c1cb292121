//! Dense grid completion.

use std::collections::{BTreeMap, BTreeSet};

use crime_panel_models::{PanelRow, Period};

use crate::time::Normalized;

/// Crosses distinct locations with distinct periods, aggregates raw
/// counts by summation, and zero-fills the cells with no incidents.
///
/// The output holds exactly `locations x periods` rows with unique
/// (location, period) keys, sorted by location then period. Every
/// feature column starts at its default; later stages fill their own.
#[must_use]
pub fn complete(normalized: &Normalized) -> Vec<PanelRow> {
    let locations: BTreeSet<&str> = normalized
        .incidents
        .iter()
        .map(|i| i.location.as_str())
        .collect();

    let mut counts: BTreeMap<(&str, Period), u32> = BTreeMap::new();
    for incident in &normalized.incidents {
        let cell = counts
            .entry((incident.location.as_str(), incident.period))
            .or_insert(0);
        *cell = cell.saturating_add(incident.count);
    }

    let mut rows = Vec::with_capacity(locations.len() * normalized.periods.len());
    for &location in &locations {
        for ctx in &normalized.periods {
            rows.push(PanelRow {
                location: location.to_string(),
                year: ctx.period.year,
                month: ctx.period.month,
                month_sin: ctx.month_sin,
                month_cos: ctx.month_cos,
                time_index_norm: ctx.time_index_norm,
                holiday_month: ctx.holiday_month,
                incident_count: counts.get(&(location, ctx.period)).copied().unwrap_or(0),
                ..PanelRow::default()
            });
        }
    }

    log::debug!(
        "dense grid: {} locations x {} periods = {} rows",
        locations.len(),
        normalized.periods.len(),
        rows.len()
    );
    rows
}
