//! Guided build: prompts for every input table and parameter.

use std::fs;
use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};
use indicatif::MultiProgress;

use crime_panel_models::FeatureParams;

use crate::pipeline::{self, NeighborInput, RunConfig};

/// Walks the user through a full pipeline run.
///
/// # Errors
///
/// Returns an error if a prompt is aborted, a parameter file fails to
/// parse, or the run itself fails.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Crime panel builder");
    println!();

    let incidents = path_prompt("Incident table", "data/incidents.csv")?;
    let population = path_prompt("Population/density table", "data/population.csv")?;
    let deprivation_2010 = path_prompt("Deprivation snapshot (2010)", "data/imd_2010.csv")?;
    let deprivation_2015 = path_prompt("Deprivation snapshot (2015)", "data/imd_2015.csv")?;
    let deprivation_2019 = path_prompt("Deprivation snapshot (2019)", "data/imd_2019.csv")?;
    let housing = path_prompt("Housing composition table", "data/housing.csv")?;

    let neighbor_mode = Select::new()
        .with_prompt("Neighbor edges")
        .items(&["Prebuilt edge table", "Build from centroids"])
        .default(0)
        .interact()?;
    let neighbors = if neighbor_mode == 0 {
        NeighborInput::Edges(path_prompt("Edge table", "data/neighbor_edges.csv")?)
    } else {
        NeighborInput::Centroids(path_prompt("Centroid table", "data/centroids.csv")?)
    };

    let residential = if Confirm::new()
        .with_prompt("Filter to residential-dominant locations?")
        .default(false)
        .interact()?
    {
        Some(path_prompt("Residential classification table", "data/residential.csv")?)
    } else {
        None
    };

    let params = prompt_params()?;
    let output = path_prompt("Output directory", "data/panel")?;

    pipeline::run(
        RunConfig {
            incidents,
            population,
            deprivation_2010,
            deprivation_2015,
            deprivation_2019,
            housing,
            neighbors,
            residential,
            params,
            output,
        },
        multi,
    )?;

    Ok(())
}

/// Parameter source selection: defaults, a TOML file, or field-by-field
/// prompts seeded with the defaults.
fn prompt_params() -> Result<FeatureParams, Box<dyn std::error::Error>> {
    let choice = Select::new()
        .with_prompt("Parameters")
        .items(&["Use defaults", "Load from TOML file", "Adjust individually"])
        .default(0)
        .interact()?;

    match choice {
        1 => {
            let path = path_prompt("Parameter file", "params.toml")?;
            Ok(FeatureParams::from_toml_str(&fs::read_to_string(path)?)?)
        }
        2 => {
            let defaults = FeatureParams::default();
            Ok(FeatureParams {
                max_lag: Input::new()
                    .with_prompt("Risk history horizon (months)")
                    .default(defaults.max_lag)
                    .interact_text()?,
                base_probability: Input::new()
                    .with_prompt("Base repeat probability")
                    .default(defaults.base_probability)
                    .interact_text()?,
                neighbors_k: Input::new()
                    .with_prompt("Neighbors per location")
                    .default(defaults.neighbors_k)
                    .interact_text()?,
                distance_bias: Input::new()
                    .with_prompt("Neighbor distance bias")
                    .default(defaults.distance_bias)
                    .interact_text()?,
                train_fraction: Input::new()
                    .with_prompt("Training period fraction")
                    .default(defaults.train_fraction)
                    .interact_text()?,
            })
        }
        _ => Ok(FeatureParams::default()),
    }
}

fn path_prompt(prompt: &str, default: &str) -> Result<PathBuf, dialoguer::Error> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?;
    Ok(PathBuf::from(raw))
}
