#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `crime-panel` binary.
//!
//! Three subcommands: `build` runs the whole feature pipeline over a set
//! of input CSV tables, `neighbors` constructs a k-nearest-neighbor edge
//! table from location centroids, and `interactive` prompts for every
//! input and parameter step by step.
//!
//! Logging goes through `indicatif-log-bridge` (see [`logging`]) so
//! `log` output and progress bars never fight for the terminal.

mod interactive;
mod logging;
mod pipeline;

use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crime_panel_models::FeatureParams;

use crate::pipeline::{NeighborInput, RunConfig};

#[derive(Parser)]
#[command(
    name = "crime-panel",
    about = "Leak-safe spatiotemporal feature pipeline for location-month incident panels"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[allow(clippy::large_enum_variant)]
enum Commands {
    /// Build the full feature panel from the input tables
    Build(BuildArgs),
    /// Build a k-nearest-neighbor edge table from location centroids
    Neighbors(NeighborsArgs),
    /// Prompt for inputs and parameters step by step
    Interactive,
}

#[derive(Args)]
struct BuildArgs {
    /// Raw incident table (location, period, count)
    #[arg(long)]
    incidents: PathBuf,

    /// Wide-by-year population/density table
    #[arg(long)]
    population: PathBuf,

    /// Deprivation snapshot joined for panel years up to 2014
    #[arg(long = "deprivation-2010")]
    deprivation_2010: PathBuf,

    /// Deprivation snapshot joined for panel years 2015-2018
    #[arg(long = "deprivation-2015")]
    deprivation_2015: PathBuf,

    /// Deprivation snapshot joined for panel years 2019 onwards
    #[arg(long = "deprivation-2019")]
    deprivation_2019: PathBuf,

    /// Static housing-stock composition table
    #[arg(long)]
    housing: PathBuf,

    /// Prebuilt neighbor edge table
    #[arg(long, conflicts_with = "centroids", required_unless_present = "centroids")]
    edges: Option<PathBuf>,

    /// Location centroids; the edge table is built in-run
    #[arg(long)]
    centroids: Option<PathBuf>,

    /// Residential classification table; enables the residential filter
    #[arg(long)]
    residential: Option<PathBuf>,

    /// TOML parameter file overriding the defaults
    #[arg(long)]
    params: Option<PathBuf>,

    /// Directory the artifacts are written into
    #[arg(long, default_value = "data/panel")]
    output: PathBuf,
}

impl BuildArgs {
    fn into_config(self) -> Result<RunConfig, Box<dyn std::error::Error>> {
        let params = match &self.params {
            Some(path) => FeatureParams::from_toml_str(&fs::read_to_string(path)?)?,
            None => FeatureParams::default(),
        };

        // clap guarantees exactly one of the two is present.
        let neighbors = match (self.edges, self.centroids) {
            (Some(edges), None) => NeighborInput::Edges(edges),
            (None, Some(centroids)) => NeighborInput::Centroids(centroids),
            _ => unreachable!("clap rejects --edges together with --centroids"),
        };

        Ok(RunConfig {
            incidents: self.incidents,
            population: self.population,
            deprivation_2010: self.deprivation_2010,
            deprivation_2015: self.deprivation_2015,
            deprivation_2019: self.deprivation_2019,
            housing: self.housing,
            neighbors,
            residential: self.residential,
            params,
            output: self.output,
        })
    }
}

#[derive(Args)]
struct NeighborsArgs {
    /// Location centroid table (location, x, y)
    #[arg(long)]
    centroids: PathBuf,

    /// Neighbors per location
    #[arg(long, default_value_t = 5)]
    k: usize,

    /// Edge table output file
    #[arg(long, default_value = "data/neighbor_edges.csv")]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = logging::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => pipeline::run(args.into_config()?, &multi)?,
        Commands::Neighbors(args) => {
            pipeline::build_neighbor_table(&args.centroids, args.k, &args.output)?;
        }
        Commands::Interactive => interactive::run(&multi)?,
    }

    Ok(())
}
