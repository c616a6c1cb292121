//! Input-table bundle for one pipeline run.

use std::path::Path;

use crime_panel_ingest::TableSource;
use crime_panel_models::{
    Centroid, DemographicObservation, DeprivationRecord, HousingProfile, NeighborEdge,
    RawIncident, ResidentialClass,
};

/// Where the neighbor edges of a run come from.
#[derive(Debug)]
pub enum NeighborSource {
    /// A prebuilt edge table, validated before aggregation.
    Edges(TableSource<NeighborEdge>),
    /// Location centroids; the edge table is built in-run with the
    /// configured k.
    Centroids(TableSource<Centroid>),
}

/// Every table a pipeline run consumes.
///
/// Each field is a [`TableSource`], so callers mix files, in-memory
/// tables, and deferred loaders freely. Deprivation snapshots are
/// resolved lazily: a snapshot whose year band no panel row falls in is
/// never read.
#[derive(Debug)]
pub struct PanelSources {
    /// Raw incident rows.
    pub incidents: TableSource<RawIncident>,
    /// Long (location, year) population/density observations.
    pub population: TableSource<DemographicObservation>,
    /// Deprivation snapshot joined for panel years up to 2014.
    pub deprivation_2010: TableSource<DeprivationRecord>,
    /// Deprivation snapshot joined for panel years 2015-2018.
    pub deprivation_2015: TableSource<DeprivationRecord>,
    /// Deprivation snapshot joined for panel years 2019 onwards.
    pub deprivation_2019: TableSource<DeprivationRecord>,
    /// Static housing-stock composition.
    pub housing: TableSource<HousingProfile>,
    /// Neighbor edges, prebuilt or derived from centroids.
    pub neighbors: NeighborSource,
    /// Residential-dominance classes; when present, the panel is filtered
    /// to residential-dominant locations before the engines run.
    pub residential: Option<TableSource<ResidentialClass>>,
}

impl PanelSources {
    /// The file-backed inputs of this run, labeled for the manifest.
    /// In-memory and deferred tables have no file to fingerprint and are
    /// skipped.
    #[must_use]
    pub fn file_inputs(&self) -> Vec<(&'static str, &Path)> {
        fn push<'a, T>(
            inputs: &mut Vec<(&'static str, &'a Path)>,
            label: &'static str,
            source: &'a TableSource<T>,
        ) {
            if let TableSource::Path(path) = source {
                inputs.push((label, path.as_path()));
            }
        }

        let mut inputs = Vec::new();
        push(&mut inputs, "incidents", &self.incidents);
        push(&mut inputs, "population", &self.population);
        push(&mut inputs, "deprivation_2010", &self.deprivation_2010);
        push(&mut inputs, "deprivation_2015", &self.deprivation_2015);
        push(&mut inputs, "deprivation_2019", &self.deprivation_2019);
        push(&mut inputs, "housing", &self.housing);
        match &self.neighbors {
            NeighborSource::Edges(source) => push(&mut inputs, "neighbor_edges", source),
            NeighborSource::Centroids(source) => push(&mut inputs, "centroids", source),
        }
        if let Some(source) = &self.residential {
            push(&mut inputs, "residential", source);
        }
        inputs
    }
}
