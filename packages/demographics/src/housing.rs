//! Static housing composition join.

use std::collections::{BTreeMap, BTreeSet};

use crime_panel_models::{DataQuality, HousingProfile, PanelRow};

/// Joins housing stock fractions onto the panel by location.
///
/// The profile table has no time dimension; every period of a location
/// gets the same fractions. Locations absent from the table get all
/// fractions zero-filled with `housing_missing` set, so a downstream
/// consumer can tell a filled zero from an observed one.
#[must_use]
pub fn attach(
    mut panel: Vec<PanelRow>,
    profiles: &[HousingProfile],
    quality: &mut DataQuality,
) -> Vec<PanelRow> {
    let by_location: BTreeMap<&str, &HousingProfile> = profiles
        .iter()
        .map(|profile| (profile.location.as_str(), profile))
        .collect();

    let mut unmatched: BTreeSet<String> = BTreeSet::new();
    for row in &mut panel {
        match by_location.get(row.location.as_str()) {
            Some(profile) => {
                row.frac_detached = profile.detached;
                row.frac_semi_detached = profile.semi_detached;
                row.frac_terraced = profile.terraced;
                row.frac_flat = profile.flat;
                row.frac_other = profile.other;
                row.housing_missing = false;
            }
            None => {
                row.frac_detached = 0.0;
                row.frac_semi_detached = 0.0;
                row.frac_terraced = 0.0;
                row.frac_flat = 0.0;
                row.frac_other = 0.0;
                row.housing_missing = true;
                unmatched.insert(row.location.clone());
            }
        }
    }

    if !unmatched.is_empty() {
        log::warn!(
            "housing: {} locations absent from the source, fractions zero-filled",
            unmatched.len()
        );
    }
    quality.locations_missing_housing += unmatched.len();

    panel
}
