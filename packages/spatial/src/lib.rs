#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial neighbor features for the dense panel.
//!
//! [`neighbors::attach`] aggregates each location's same-period neighbor
//! counts through a precomputed k-nearest-neighbor edge table, after
//! checking the table's shape invariants. [`build::build_edges`]
//! constructs such a table from projected centroids with an R-tree when
//! no precomputed one exists.

pub mod build;
pub mod neighbors;

use thiserror::Error;

pub use build::build_edges;
pub use neighbors::{attach, validate_edges};

/// Errors that can occur in edge validation, construction, or joining.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// A location carries the wrong number of edges.
    #[error("location {location} has {found} neighbor edges, expected exactly {expected}")]
    EdgeCount {
        /// Offending location.
        location: String,
        /// Required edges per location.
        expected: usize,
        /// Edges actually present.
        found: usize,
    },

    /// A location's edge ranks are not exactly 1..k.
    #[error("location {location} has edge ranks [{found}], expected 1..={expected}")]
    EdgeRanks {
        /// Offending location.
        location: String,
        /// Required top rank.
        expected: usize,
        /// Ranks actually present, comma-separated.
        found: String,
    },

    /// An edge points from a location to itself.
    #[error("location {location} has a self-edge at rank {rank}")]
    SelfEdge {
        /// Offending location.
        location: String,
        /// Rank of the self-edge.
        rank: u32,
    },

    /// An edge distance is negative or not finite.
    #[error("edge {location} -> {neighbor} has invalid distance {distance}")]
    EdgeDistance {
        /// Edge origin.
        location: String,
        /// Edge target.
        neighbor: String,
        /// Offending distance.
        distance: f64,
    },

    /// A panel location has no edges at all.
    #[error("panel location {location} is absent from the neighbor edge table")]
    MissingEdges {
        /// Offending location.
        location: String,
    },

    /// A centroid appears more than once in the builder input.
    #[error("duplicate centroid for location {location}")]
    DuplicateCentroid {
        /// Offending location.
        location: String,
    },

    /// A centroid has non-finite coordinates.
    #[error("centroid for location {location} has non-finite coordinates")]
    BadCentroid {
        /// Offending location.
        location: String,
    },

    /// Too few centroids to give every location k neighbors.
    #[error("{found} centroids cannot give every location {k} neighbors")]
    TooFewCentroids {
        /// Neighbors requested per location.
        k: usize,
        /// Centroids provided.
        found: usize,
    },
}
