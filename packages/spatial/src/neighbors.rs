//! Edge-table validation and same-period neighbor aggregation.

use std::collections::{BTreeMap, BTreeSet};

use crime_panel_models::{DataQuality, NeighborEdge, PanelRow, Period};

use crate::SpatialError;

/// Checks the edge table's shape invariants and groups it by location.
///
/// Every location must carry exactly `k` edges with ranks exactly 1..k
/// and no self-edges; distances must be finite and non-negative. The
/// returned groups hold each location's edges in ascending rank order.
///
/// # Errors
///
/// Returns the first violated invariant.
pub fn validate_edges(
    edges: &[NeighborEdge],
    k: usize,
) -> Result<BTreeMap<&str, Vec<&NeighborEdge>>, SpatialError> {
    let mut grouped: BTreeMap<&str, Vec<&NeighborEdge>> = BTreeMap::new();
    for edge in edges {
        if !edge.distance.is_finite() || edge.distance < 0.0 {
            return Err(SpatialError::EdgeDistance {
                location: edge.location.clone(),
                neighbor: edge.neighbor.clone(),
                distance: edge.distance,
            });
        }
        if edge.location == edge.neighbor {
            return Err(SpatialError::SelfEdge {
                location: edge.location.clone(),
                rank: edge.rank,
            });
        }
        grouped.entry(edge.location.as_str()).or_default().push(edge);
    }

    for (location, group) in &mut grouped {
        if group.len() != k {
            return Err(SpatialError::EdgeCount {
                location: (*location).to_string(),
                expected: k,
                found: group.len(),
            });
        }
        group.sort_by_key(|edge| edge.rank);

        if !group.iter().map(|edge| edge.rank).eq((1u32..).take(k)) {
            let found: Vec<String> = group.iter().map(|edge| edge.rank.to_string()).collect();
            return Err(SpatialError::EdgeRanks {
                location: (*location).to_string(),
                expected: k,
                found: found.join(", "),
            });
        }

        let monotonic = group
            .windows(2)
            .all(|pair| pair[0].distance <= pair[1].distance);
        if !monotonic {
            log::warn!("edges for {location} are not distance-ordered by rank");
        }
    }

    Ok(grouped)
}

/// Per-row aggregates computed from the k neighbors' same-period counts.
struct Aggregates {
    avg: Option<f64>,
    max: Option<f64>,
    std: Option<f64>,
    weighted_avg: Option<f64>,
    closest: Option<f64>,
}

/// Joins same-period neighbor aggregates onto every panel row.
///
/// For each (location, period) cell the k neighbors' counts in that same
/// period feed a mean, max, sample std, inverse-distance-weighted
/// average with weight `1 / (distance + distance_bias)`, and the rank-1
/// neighbor's count. Neighbors absent from the panel contribute nothing:
/// aggregates run over the values actually present, and over zero
/// present values they are null. `distance_bias` must be positive.
///
/// # Errors
///
/// Returns an error if the edge table violates its shape invariants or
/// lacks a panel location entirely.
#[allow(clippy::cast_precision_loss)]
pub fn attach(
    mut panel: Vec<PanelRow>,
    edges: &[NeighborEdge],
    k: usize,
    distance_bias: f64,
    quality: &mut DataQuality,
) -> Result<Vec<PanelRow>, SpatialError> {
    let grouped = validate_edges(edges, k)?;

    let panel_locations: BTreeSet<&str> =
        panel.iter().map(|row| row.location.as_str()).collect();
    for &location in &panel_locations {
        if !grouped.contains_key(location) {
            return Err(SpatialError::MissingEdges {
                location: location.to_string(),
            });
        }
    }

    let outside = edges
        .iter()
        .filter(|edge| {
            panel_locations.contains(edge.location.as_str())
                && !panel_locations.contains(edge.neighbor.as_str())
        })
        .count();
    if outside > 0 {
        log::warn!("{outside} neighbor edges point outside the panel and contribute nulls");
    }
    quality.edges_outside_panel += outside;

    let counts: BTreeMap<(&str, Period), f64> = panel
        .iter()
        .map(|row| ((row.location.as_str(), row.period()), f64::from(row.incident_count)))
        .collect();

    let results: Vec<Aggregates> = panel
        .iter()
        .map(|row| {
            let period = row.period();
            let mut present: Vec<(f64, f64)> = Vec::with_capacity(k);
            let mut closest = None;

            if let Some(group) = grouped.get(row.location.as_str()) {
                for edge in group {
                    let count = counts.get(&(edge.neighbor.as_str(), period)).copied();
                    if edge.rank == 1 {
                        closest = count;
                    }
                    if let Some(count) = count {
                        present.push((count, 1.0 / (edge.distance + distance_bias)));
                    }
                }
            }

            let n = present.len();
            let avg = (n > 0)
                .then(|| present.iter().map(|(count, _)| count).sum::<f64>() / n as f64);
            let max = (n > 0).then(|| {
                present
                    .iter()
                    .map(|(count, _)| *count)
                    .fold(f64::NEG_INFINITY, f64::max)
            });
            let std = match (n, avg) {
                (2.., Some(mean)) => Some(
                    (present
                        .iter()
                        .map(|(count, _)| (count - mean).powi(2))
                        .sum::<f64>()
                        / (n - 1) as f64)
                        .sqrt(),
                ),
                _ => None,
            };
            let weighted_avg = (n > 0).then(|| {
                let weight_sum: f64 = present.iter().map(|(_, weight)| weight).sum();
                present
                    .iter()
                    .map(|(count, weight)| count * weight)
                    .sum::<f64>()
                    / weight_sum
            });

            Aggregates {
                avg,
                max,
                std,
                weighted_avg,
                closest,
            }
        })
        .collect();

    for (row, agg) in panel.iter_mut().zip(results) {
        row.neighbor_count_avg = agg.avg;
        row.neighbor_count_max = agg.max;
        row.neighbor_count_std = agg.std;
        row.neighbor_count_weighted_avg = agg.weighted_avg;
        row.closest_neighbor_count = agg.closest;
    }

    Ok(panel)
}
