//! Deprivation score joins by snapshot year band.

use std::collections::{BTreeMap, BTreeSet};

use crime_panel_models::{DataQuality, DeprivationEpoch, DeprivationRecord, PanelRow};

use crate::DemographicsError;

/// Joins deprivation scores onto the panel, snapshot by year band.
///
/// Each row's year selects its epoch via [`DeprivationEpoch::for_year`]
/// and joins against that epoch's table alone. Only epochs the panel
/// actually uses need a table; a used epoch without one is fatal.
/// Locations absent from a used snapshot keep null scores and are
/// counted in `quality`.
///
/// # Errors
///
/// Returns [`DemographicsError::MissingSnapshot`] if a panel row falls
/// in a year band whose snapshot table was not provided.
pub fn attach(
    mut panel: Vec<PanelRow>,
    snapshots: &BTreeMap<DeprivationEpoch, Vec<DeprivationRecord>>,
    quality: &mut DataQuality,
) -> Result<Vec<PanelRow>, DemographicsError> {
    let mut used_years: BTreeMap<DeprivationEpoch, (i32, i32)> = BTreeMap::new();
    for row in &panel {
        let epoch = DeprivationEpoch::for_year(row.year);
        let range = used_years.entry(epoch).or_insert((row.year, row.year));
        range.0 = range.0.min(row.year);
        range.1 = range.1.max(row.year);
    }

    for (&epoch, &(first, last)) in &used_years {
        if !snapshots.contains_key(&epoch) {
            return Err(DemographicsError::MissingSnapshot {
                epoch,
                years: if first == last {
                    first.to_string()
                } else {
                    format!("{first}-{last}")
                },
            });
        }
    }

    let mut indexed: BTreeMap<DeprivationEpoch, BTreeMap<&str, &DeprivationRecord>> =
        BTreeMap::new();
    for (&epoch, records) in snapshots {
        let index = indexed.entry(epoch).or_default();
        for record in records {
            index.insert(record.location.as_str(), record);
        }
    }

    let mut unmatched: BTreeSet<String> = BTreeSet::new();
    for row in &mut panel {
        let epoch = DeprivationEpoch::for_year(row.year);
        let record = indexed
            .get(&epoch)
            .and_then(|index| index.get(row.location.as_str()));
        match record {
            Some(record) => {
                row.imd_score = Some(record.imd_score);
                row.income_score = Some(record.income_score);
                row.employment_score = Some(record.employment_score);
                row.education_score = Some(record.education_score);
                row.health_score = Some(record.health_score);
                row.crime_score = Some(record.crime_score);
                row.housing_barriers_score = Some(record.housing_barriers_score);
                row.living_env_score = Some(record.living_env_score);
            }
            None => {
                unmatched.insert(row.location.clone());
            }
        }
    }

    if !unmatched.is_empty() {
        log::warn!(
            "deprivation: {} locations absent from at least one used snapshot, scores left null",
            unmatched.len()
        );
    }
    quality.locations_missing_deprivation += unmatched.len();

    for (epoch, (first, last)) in used_years {
        log::debug!("deprivation: {epoch} joined for panel years {first}-{last}");
    }

    Ok(panel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(location: &str, imd_score: f64) -> DeprivationRecord {
        DeprivationRecord {
            location: location.to_string(),
            imd_score,
            income_score: 0.2,
            employment_score: 0.1,
            education_score: 11.0,
            health_score: 0.5,
            crime_score: 0.3,
            housing_barriers_score: 20.0,
            living_env_score: 25.0,
        }
    }

    fn row(location: &str, year: i32) -> PanelRow {
        PanelRow {
            location: location.to_string(),
            year,
            month: 6,
            ..PanelRow::default()
        }
    }

    fn snapshots(
        entries: &[(DeprivationEpoch, &str, f64)],
    ) -> BTreeMap<DeprivationEpoch, Vec<DeprivationRecord>> {
        let mut map: BTreeMap<DeprivationEpoch, Vec<DeprivationRecord>> = BTreeMap::new();
        for &(epoch, location, score) in entries {
            map.entry(epoch).or_default().push(record(location, score));
        }
        map
    }

    #[test]
    fn joins_each_row_against_its_band() {
        let mut quality = DataQuality::default();
        let tables = snapshots(&[
            (DeprivationEpoch::Imd2010, "A", 10.0),
            (DeprivationEpoch::Imd2015, "A", 15.0),
            (DeprivationEpoch::Imd2019, "A", 19.0),
        ]);
        let panel = attach(
            vec![row("A", 2014), row("A", 2015), row("A", 2020)],
            &tables,
            &mut quality,
        )
        .unwrap();
        assert_eq!(panel[0].imd_score, Some(10.0));
        assert_eq!(panel[1].imd_score, Some(15.0));
        assert_eq!(panel[2].imd_score, Some(19.0));
    }

    #[test]
    fn pre_2010_years_use_the_first_band() {
        let mut quality = DataQuality::default();
        let tables = snapshots(&[(DeprivationEpoch::Imd2010, "A", 10.0)]);
        let panel = attach(vec![row("A", 2008)], &tables, &mut quality).unwrap();
        assert_eq!(panel[0].imd_score, Some(10.0));
    }

    #[test]
    fn missing_used_snapshot_is_fatal() {
        let mut quality = DataQuality::default();
        let tables = snapshots(&[(DeprivationEpoch::Imd2010, "A", 10.0)]);
        let err = attach(vec![row("A", 2016)], &tables, &mut quality).unwrap_err();
        match err {
            DemographicsError::MissingSnapshot { epoch, years } => {
                assert_eq!(epoch, DeprivationEpoch::Imd2015);
                assert_eq!(years, "2016");
            }
        }
    }

    #[test]
    fn unused_snapshots_may_be_absent() {
        let mut quality = DataQuality::default();
        let tables = snapshots(&[(DeprivationEpoch::Imd2019, "A", 19.0)]);
        let panel = attach(vec![row("A", 2021)], &tables, &mut quality).unwrap();
        assert_eq!(panel[0].imd_score, Some(19.0));
    }

    #[test]
    fn unmatched_location_keeps_nulls_and_counts_once() {
        let mut quality = DataQuality::default();
        let tables = snapshots(&[(DeprivationEpoch::Imd2019, "A", 19.0)]);
        let panel = attach(
            vec![row("Z", 2020), row("Z", 2021)],
            &tables,
            &mut quality,
        )
        .unwrap();
        assert_eq!(panel[0].imd_score, None);
        assert_eq!(panel[1].crime_score, None);
        assert_eq!(quality.locations_missing_deprivation, 1);
    }
}
