//! File-level wiring of one `build` run.
//!
//! Turns a [`RunConfig`] of paths into [`PanelSources`], drives
//! `crime_panel_dataset` through its stages, and writes the artifact set
//! (feature table, X/y split files, run manifest) into the output
//! directory, with a step-level progress bar on top.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crime_panel_dataset::{
    BuiltPanel, DatasetError, NeighborSource, PanelSources, RunManifest, build_panel,
    chronological_split, fingerprint_files, write_features, write_manifest, write_split,
};
use crime_panel_ingest::TableSource;
use crime_panel_models::{Centroid, FeatureParams};
use crime_panel_spatial::build_edges;

/// Where the run's neighbor edges come from.
pub enum NeighborInput {
    /// A prebuilt edge table on disk.
    Edges(PathBuf),
    /// A centroid table; edges are built in-run with the configured k.
    Centroids(PathBuf),
}

/// Everything one `build` run needs: the input table paths, the
/// parameters, and the output directory.
pub struct RunConfig {
    pub incidents: PathBuf,
    pub population: PathBuf,
    pub deprivation_2010: PathBuf,
    pub deprivation_2015: PathBuf,
    pub deprivation_2019: PathBuf,
    pub housing: PathBuf,
    pub neighbors: NeighborInput,
    pub residential: Option<PathBuf>,
    pub params: FeatureParams,
    pub output: PathBuf,
}

impl RunConfig {
    fn sources(&self) -> PanelSources {
        PanelSources {
            incidents: TableSource::from(self.incidents.as_path()),
            population: TableSource::from(self.population.as_path()),
            deprivation_2010: TableSource::from(self.deprivation_2010.as_path()),
            deprivation_2015: TableSource::from(self.deprivation_2015.as_path()),
            deprivation_2019: TableSource::from(self.deprivation_2019.as_path()),
            housing: TableSource::from(self.housing.as_path()),
            neighbors: match &self.neighbors {
                NeighborInput::Edges(path) => NeighborSource::Edges(TableSource::from(path.as_path())),
                NeighborInput::Centroids(path) => {
                    NeighborSource::Centroids(TableSource::from(path.as_path()))
                }
            },
            residential: self
                .residential
                .as_deref()
                .map(TableSource::from),
        }
    }
}

/// Runs the full pipeline and writes every artifact.
///
/// # Errors
///
/// Returns an error if a parameter is invalid, an input table fails to
/// load, a stage fails, or an artifact cannot be written.
pub fn run(config: RunConfig, multi: &MultiProgress) -> Result<(), DatasetError> {
    let started = Instant::now();
    let bar = steps_bar(multi, 5);

    bar.set_message("hashing inputs");
    let sources = config.sources();
    let inputs = fingerprint_files(&sources.file_inputs())?;
    bar.inc(1);

    bar.set_message("building panel");
    let BuiltPanel { rows, quality } = build_panel(sources, &config.params)?;
    bar.inc(1);

    fs::create_dir_all(&config.output).map_err(|source| DatasetError::Io {
        path: config.output.display().to_string(),
        source,
    })?;

    bar.set_message("writing feature table");
    let columns = write_features(&config.output, &rows)?;
    bar.inc(1);

    bar.set_message("cutting chronological split");
    let split = chronological_split(rows, config.params.train_fraction);
    write_split(&config.output, &split)?;
    bar.inc(1);

    bar.set_message("stamping run manifest");
    let manifest = RunManifest::capture(&config.params, &quality, &split, columns, inputs);
    write_manifest(&config.output, &manifest)?;
    bar.inc(1);

    bar.finish_with_message(format!(
        "panel written to {} in {:.1?}",
        config.output.display(),
        started.elapsed()
    ));
    Ok(())
}

/// Builds a k-nearest-neighbor edge table from a centroid CSV and writes
/// it to `output`, ready to feed back in through `build --edges`.
///
/// # Errors
///
/// Returns an error if the centroid table fails to load, the builder
/// rejects it, or the output file cannot be written.
pub fn build_neighbor_table(
    centroids: &Path,
    k: usize,
    output: &Path,
) -> Result<(), DatasetError> {
    let centroids: Vec<Centroid> = TableSource::from(centroids).resolve()?;
    let edges = build_edges(&centroids, k)?;

    if let Some(dir) = output.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(|source| DatasetError::Io {
            path: dir.display().to_string(),
            source,
        })?;
    }

    let mut writer = csv::Writer::from_path(output).map_err(|source| DatasetError::Csv {
        table: "neighbor_edges",
        source,
    })?;
    for edge in &edges {
        writer.serialize(edge).map_err(|source| DatasetError::Csv {
            table: "neighbor_edges",
            source,
        })?;
    }
    writer.flush().map_err(|source| DatasetError::Io {
        path: output.display().to_string(),
        source,
    })?;

    log::info!(
        "wrote {} edges ({} locations x {k}) to {}",
        edges.len(),
        centroids.len(),
        output.display()
    );
    Ok(())
}

/// A step-level progress bar in the run's house style.
fn steps_bar(multi: &MultiProgress, total: u64) -> ProgressBar {
    let bar = multi.add(ProgressBar::new(total));
    bar.set_style(
        ProgressStyle::with_template(
            "{msg} {wide_bar:.green/dim} {pos}/{len} [{elapsed_precise}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-"),
    );
    bar
}
