//! Parallel per-location scans over the panel.
//!
//! The panel arrives as one flat row vector in whatever order the grid
//! completer produced. Scans that look backwards in time only make sense
//! over a single location's rows in chronological order, so this module
//! owns the partition→sort→scan→reassemble cycle and guarantees the
//! caller gets the rows back in their original positions.

use std::collections::BTreeMap;

use crime_panel_models::PanelRow;
use rayon::prelude::*;

/// Splits `panel` by location, sorts each partition chronologically, runs
/// `scan` over each partition's rows in place (partitions in parallel),
/// and reassembles the panel in its original row order.
pub fn scan_partitions(
    panel: Vec<PanelRow>,
    scan: impl Fn(&mut [PanelRow]) + Sync,
) -> Vec<PanelRow> {
    let total = panel.len();
    let mut partitions: BTreeMap<String, (Vec<usize>, Vec<PanelRow>)> = BTreeMap::new();
    for (index, row) in panel.into_iter().enumerate() {
        let (indices, rows) = partitions.entry(row.location.clone()).or_default();
        indices.push(index);
        rows.push(row);
    }

    partitions.par_iter_mut().for_each(|(_, (indices, rows))| {
        let mut paired: Vec<(usize, PanelRow)> = std::mem::take(indices)
            .into_iter()
            .zip(std::mem::take(rows))
            .collect();
        paired.sort_by_key(|(_, row)| row.period());
        let (sorted_indices, sorted_rows): (Vec<usize>, Vec<PanelRow>) =
            paired.into_iter().unzip();
        *indices = sorted_indices;
        *rows = sorted_rows;
        scan(rows);
    });

    let mut slots: Vec<Option<PanelRow>> = vec![None; total];
    for (indices, rows) in partitions.into_values() {
        for (index, row) in indices.into_iter().zip(rows) {
            slots[index] = Some(row);
        }
    }
    let reassembled: Vec<PanelRow> = slots.into_iter().flatten().collect();
    debug_assert_eq!(reassembled.len(), total);
    reassembled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(location: &str, year: i32, month: u32) -> PanelRow {
        PanelRow {
            location: location.to_string(),
            year,
            month,
            ..PanelRow::default()
        }
    }

    #[test]
    fn reassembly_preserves_input_order() {
        let panel = vec![
            row("b", 2021, 2),
            row("a", 2021, 1),
            row("b", 2021, 1),
            row("a", 2021, 2),
        ];
        let keys: Vec<(String, i32, u32)> = panel
            .iter()
            .map(|r| (r.location.clone(), r.year, r.month))
            .collect();
        let scanned = scan_partitions(panel, |_| {});
        let scanned_keys: Vec<(String, i32, u32)> = scanned
            .iter()
            .map(|r| (r.location.clone(), r.year, r.month))
            .collect();
        assert_eq!(scanned_keys, keys);
    }

    #[test]
    fn scans_see_rows_in_chronological_order() {
        let panel = vec![
            row("a", 2021, 3),
            row("a", 2020, 12),
            row("a", 2021, 1),
        ];
        let scanned = scan_partitions(panel, |rows| {
            let mut rank = 0.0;
            for row in rows.iter_mut() {
                row.lag_1 = Some(rank);
                rank += 1.0;
            }
        });
        // Chronological ranks land back on the original positions.
        assert_eq!(scanned[0].lag_1, Some(2.0));
        assert_eq!(scanned[1].lag_1, Some(0.0));
        assert_eq!(scanned[2].lag_1, Some(1.0));
    }

    #[test]
    fn partitions_are_isolated_by_location() {
        let panel = vec![
            row("a", 2021, 1),
            row("b", 2021, 1),
            row("a", 2021, 2),
            row("b", 2021, 2),
            row("b", 2021, 3),
        ];
        let scanned = scan_partitions(panel, |rows| {
            let size = u32::try_from(rows.len()).unwrap();
            for row in rows.iter_mut() {
                row.incident_count = size;
            }
        });
        assert_eq!(scanned[0].incident_count, 2);
        assert_eq!(scanned[1].incident_count, 3);
        assert_eq!(scanned[4].incident_count, 3);
    }

    #[test]
    fn empty_panel_stays_empty() {
        assert!(scan_partitions(Vec::new(), |_| {}).is_empty());
    }
}
