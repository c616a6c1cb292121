//! Stage orchestration for one pipeline run.
//!
//! [`build_panel`] runs the engines in their data-dependency order:
//! normalize → grid → population → deprivation → housing → optional
//! residential filter → spatial → temporal → risk. Each stage consumes
//! the complete panel and returns a complete new one; nothing here is
//! incremental. The deprivation snapshots are resolved lazily, so a
//! snapshot whose year band no panel row falls in is never read.

use std::collections::{BTreeMap, BTreeSet};

use log::info;

use crime_panel_grid::{complete, normalize};
use crime_panel_ingest::TableSource;
use crime_panel_models::{
    DataQuality, DeprivationEpoch, DeprivationRecord, FeatureParams, PanelRow,
};
use crime_panel_risk::RevictimizationRiskEngine;
use crime_panel_spatial::build_edges;
use crime_panel_temporal::TemporalFeatureEngine;

use crate::DatasetError;
use crate::sources::{NeighborSource, PanelSources};

/// The engineered panel of one run, with the quality counters its
/// auxiliary joins accumulated.
#[derive(Debug, Clone)]
pub struct BuiltPanel {
    /// Dense feature table, sorted by (location, period).
    pub rows: Vec<PanelRow>,
    /// Recoverable data gaps encountered along the way.
    pub quality: DataQuality,
}

/// Rejects parameter values the engines cannot run with.
///
/// # Errors
///
/// Returns [`DatasetError::Parameter`] naming the first offending field.
pub fn validate_params(params: &FeatureParams) -> Result<(), DatasetError> {
    if params.max_lag == 0 {
        return Err(parameter("max_lag", "must be at least 1"));
    }
    if !params.base_probability.is_finite()
        || params.base_probability <= 0.0
        || params.base_probability > 1.0
    {
        return Err(parameter(
            "base_probability",
            "must be a probability in (0, 1]",
        ));
    }
    if params.neighbors_k == 0 {
        return Err(parameter("neighbors_k", "must be at least 1"));
    }
    if !params.distance_bias.is_finite() || params.distance_bias <= 0.0 {
        return Err(parameter("distance_bias", "must be positive and finite"));
    }
    if !params.train_fraction.is_finite()
        || params.train_fraction <= 0.0
        || params.train_fraction > 1.0
    {
        return Err(parameter("train_fraction", "must lie in (0, 1]"));
    }
    Ok(())
}

fn parameter(name: &'static str, message: &str) -> DatasetError {
    DatasetError::Parameter {
        name,
        message: message.to_string(),
    }
}

/// Runs every stage over the given input tables and returns the
/// engineered panel.
///
/// # Errors
///
/// Returns an error if a parameter is invalid, an input table fails to
/// load or violates its schema, a used deprivation year band has no
/// snapshot, or the neighbor-edge table breaks its shape invariants.
pub fn build_panel(
    sources: PanelSources,
    params: &FeatureParams,
) -> Result<BuiltPanel, DatasetError> {
    validate_params(params)?;
    let mut quality = DataQuality::default();

    let raw = sources.incidents.resolve()?;
    info!("normalizing {} raw incident rows", raw.len());
    let normalized = normalize(&raw)?;
    let mut panel = complete(&normalized);

    panel = crime_panel_demographics::population::attach(
        panel,
        &sources.population.resolve()?,
        &mut quality,
    );

    let snapshots = resolve_snapshots(
        &panel,
        sources.deprivation_2010,
        sources.deprivation_2015,
        sources.deprivation_2019,
    )?;
    panel = crime_panel_demographics::deprivation::attach(panel, &snapshots, &mut quality)?;

    panel =
        crime_panel_demographics::housing::attach(panel, &sources.housing.resolve()?, &mut quality);

    if let Some(residential) = sources.residential {
        panel = filter_residential(panel, &residential.resolve()?);
    }

    let edges = match sources.neighbors {
        NeighborSource::Edges(source) => source.resolve()?,
        NeighborSource::Centroids(source) => {
            let centroids = source.resolve()?;
            info!(
                "building {}-nearest-neighbor edges from {} centroids",
                params.neighbors_k,
                centroids.len()
            );
            build_edges(&centroids, params.neighbors_k)?
        }
    };
    panel = crime_panel_spatial::attach(
        panel,
        &edges,
        params.neighbors_k,
        params.distance_bias,
        &mut quality,
    )?;

    panel = TemporalFeatureEngine::new().attach(panel);
    panel = RevictimizationRiskEngine::new(params.max_lag, params.base_probability).attach(panel);

    info!("panel build finished: {} rows", panel.len());
    Ok(BuiltPanel {
        rows: panel,
        quality,
    })
}

/// Resolves the snapshot of every epoch the panel's years actually use.
/// Unused snapshots are never read.
fn resolve_snapshots(
    panel: &[PanelRow],
    imd_2010: TableSource<DeprivationRecord>,
    imd_2015: TableSource<DeprivationRecord>,
    imd_2019: TableSource<DeprivationRecord>,
) -> Result<BTreeMap<DeprivationEpoch, Vec<DeprivationRecord>>, DatasetError> {
    let used: BTreeSet<DeprivationEpoch> = panel
        .iter()
        .map(|row| DeprivationEpoch::for_year(row.year))
        .collect();

    let mut snapshots = BTreeMap::new();
    let sources = [
        (DeprivationEpoch::Imd2010, imd_2010),
        (DeprivationEpoch::Imd2015, imd_2015),
        (DeprivationEpoch::Imd2019, imd_2019),
    ];
    for (epoch, source) in sources {
        if used.contains(&epoch) {
            snapshots.insert(epoch, source.resolve()?);
        } else {
            log::debug!("no panel year falls in the {epoch} band, snapshot not read");
        }
    }
    Ok(snapshots)
}

/// Drops every location that is not residential-dominant. Locations
/// absent from the classification table are treated as non-residential.
fn filter_residential(
    panel: Vec<PanelRow>,
    classes: &[crime_panel_models::ResidentialClass],
) -> Vec<PanelRow> {
    let keep: BTreeSet<&str> = classes
        .iter()
        .filter(|class| class.is_residential_dominant)
        .map(|class| class.location.as_str())
        .collect();

    let before: BTreeSet<&str> = panel.iter().map(|row| row.location.as_str()).collect();
    let dropped = before
        .iter()
        .filter(|location| !keep.contains(*location))
        .count();
    let kept_count = before.len() - dropped;

    let filtered: Vec<PanelRow> = panel
        .into_iter()
        .filter(|row| keep.contains(row.location.as_str()))
        .collect();
    info!("residential filter: kept {kept_count} locations, dropped {dropped}");
    filtered
}
