//! Neighbor edge table reader.
//!
//! Reads the precomputed k-nearest-neighbor table. Shape invariants
//! (exactly k edges per location, ranks 1..k, no self-edges) are checked
//! by the spatial engine when the table is used, not here.

use std::io::Read;
use std::path::Path;

use crime_panel_models::NeighborEdge;

use crate::source::CsvTable;
use crate::{IngestError, open_file, parse_rows};

const TABLE: &str = "edges";

const COLUMNS: &[&str] = &["location", "neighbor", "distance", "rank"];

/// Parses neighbor edges from any CSV reader.
///
/// # Errors
///
/// Returns an error if a required column is missing or a row fails to
/// parse.
pub fn parse(reader: impl Read) -> Result<Vec<NeighborEdge>, IngestError> {
    parse_rows(reader, TABLE, COLUMNS)
}

impl CsvTable for NeighborEdge {
    const TABLE: &'static str = TABLE;

    fn read_csv(path: &Path) -> Result<Vec<Self>, IngestError> {
        parse(open_file(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ranked_edges() {
        let data = "location,neighbor,distance,rank\nA,B,120.5,1\nA,C,300.0,2\n";
        let rows = parse(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank, 1);
        assert!((rows[1].distance - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_missing_rank_column() {
        let data = "location,neighbor,distance\nA,B,120.5\n";
        assert!(matches!(
            parse(data.as_bytes()),
            Err(IngestError::Schema { table: "edges", .. })
        ));
    }

    #[test]
    fn rejects_fractional_rank() {
        let data = "location,neighbor,distance,rank\nA,B,120.5,1.5\n";
        assert!(matches!(
            parse(data.as_bytes()),
            Err(IngestError::Csv { .. })
        ));
    }
}
