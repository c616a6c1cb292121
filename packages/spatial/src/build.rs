//! Neighbor edge construction from projected centroids.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crime_panel_models::{Centroid, NeighborEdge};

use crate::SpatialError;

/// A centroid stored in the R-tree.
struct CentroidEntry {
    location: String,
    point: [f64; 2],
}

impl RTreeObject for CentroidEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for CentroidEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx.mul_add(dx, dy * dy)
    }
}

/// Builds a k-nearest-neighbor edge table from projected centroids.
///
/// Each location gets its `k` closest other locations by Euclidean
/// distance, ranked 1..k ascending; ties break on the neighbor code so
/// the output is deterministic. The result satisfies every invariant
/// [`crate::neighbors::validate_edges`] checks.
///
/// # Errors
///
/// Returns an error on duplicate or non-finite centroids, or when fewer
/// than `k + 1` centroids are provided.
#[allow(clippy::cast_possible_truncation)]
pub fn build_edges(centroids: &[Centroid], k: usize) -> Result<Vec<NeighborEdge>, SpatialError> {
    if centroids.len() < k + 1 {
        return Err(SpatialError::TooFewCentroids {
            k,
            found: centroids.len(),
        });
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for centroid in centroids {
        if !centroid.x.is_finite() || !centroid.y.is_finite() {
            return Err(SpatialError::BadCentroid {
                location: centroid.location.clone(),
            });
        }
        if !seen.insert(centroid.location.as_str()) {
            return Err(SpatialError::DuplicateCentroid {
                location: centroid.location.clone(),
            });
        }
    }

    let entries: Vec<CentroidEntry> = centroids
        .iter()
        .map(|centroid| CentroidEntry {
            location: centroid.location.clone(),
            point: [centroid.x, centroid.y],
        })
        .collect();
    let tree = RTree::bulk_load(entries);

    let mut edges = Vec::with_capacity(centroids.len() * k);
    for centroid in centroids {
        let query = [centroid.x, centroid.y];
        let mut nearest: Vec<(f64, &str)> = tree
            .nearest_neighbor_iter(&query)
            .filter(|entry| entry.location != centroid.location)
            .take(k)
            .map(|entry| (entry.distance_2(&query).sqrt(), entry.location.as_str()))
            .collect();
        nearest.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.cmp(b.1))
        });

        for (offset, (distance, neighbor)) in nearest.into_iter().enumerate() {
            edges.push(NeighborEdge {
                location: centroid.location.clone(),
                neighbor: neighbor.to_string(),
                distance,
                rank: offset as u32 + 1,
            });
        }
    }

    log::info!(
        "built {} neighbor edges for {} locations (k = {k})",
        edges.len(),
        centroids.len()
    );
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::neighbors::validate_edges;

    fn centroid(location: &str, x: f64, y: f64) -> Centroid {
        Centroid {
            location: location.to_string(),
            x,
            y,
        }
    }

    /// Four points on a line: A(0), B(10), C(25), D(100).
    fn line() -> Vec<Centroid> {
        vec![
            centroid("A", 0.0, 0.0),
            centroid("B", 10.0, 0.0),
            centroid("C", 25.0, 0.0),
            centroid("D", 100.0, 0.0),
        ]
    }

    #[test]
    fn ranks_neighbors_by_ascending_distance() {
        let edges = build_edges(&line(), 2).unwrap();
        let a_edges: Vec<&NeighborEdge> =
            edges.iter().filter(|e| e.location == "A").collect();
        assert_eq!(a_edges.len(), 2);
        assert_eq!(a_edges[0].neighbor, "B");
        assert_eq!(a_edges[0].rank, 1);
        assert!((a_edges[0].distance - 10.0).abs() < 1e-9);
        assert_eq!(a_edges[1].neighbor, "C");
        assert!((a_edges[1].distance - 25.0).abs() < 1e-9);
    }

    #[test]
    fn never_emits_self_edges() {
        let edges = build_edges(&line(), 3).unwrap();
        assert!(edges.iter().all(|e| e.location != e.neighbor));
    }

    #[test]
    fn output_passes_validation() {
        let edges = build_edges(&line(), 2).unwrap();
        assert!(validate_edges(&edges, 2).is_ok());
    }

    #[test]
    fn rejects_too_few_centroids() {
        let centroids = vec![centroid("A", 0.0, 0.0), centroid("B", 1.0, 0.0)];
        assert!(matches!(
            build_edges(&centroids, 2),
            Err(SpatialError::TooFewCentroids { k: 2, found: 2 })
        ));
    }

    #[test]
    fn rejects_duplicate_locations() {
        let mut centroids = line();
        centroids.push(centroid("A", 5.0, 5.0));
        assert!(matches!(
            build_edges(&centroids, 2),
            Err(SpatialError::DuplicateCentroid { .. })
        ));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let mut centroids = line();
        centroids[1].y = f64::NAN;
        assert!(matches!(
            build_edges(&centroids, 2),
            Err(SpatialError::BadCentroid { .. })
        ));
    }

    #[test]
    fn uses_planar_euclidean_distance() {
        let centroids = vec![
            centroid("A", 0.0, 0.0),
            centroid("B", 3.0, 4.0),
            centroid("C", 30.0, 0.0),
        ];
        let edges = build_edges(&centroids, 1).unwrap();
        let a_edge = edges.iter().find(|e| e.location == "A").unwrap();
        assert_eq!(a_edge.neighbor, "B");
        assert!((a_edge.distance - 5.0).abs() < 1e-9);
    }
}
