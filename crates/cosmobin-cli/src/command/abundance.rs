use std::path::PathBuf;

use anyhow::bail;
use clap::Args;
use cosmobin_stats::abundance::{
    Direction, MatchOptions, Reference, abundance_match_densities, cumulative_density,
};
use serde::{Deserialize, Serialize};

use crate::util::{read_config_or_default, read_json_file, save_json};

#[derive(Debug, Clone, Args)]
pub(crate) struct AbundanceArg {
    /// JSON file with `reference` and either `source` values or `densities`
    pub input: PathBuf,
    /// JSON file with matching options
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Volume of the source population
    #[arg(long)]
    pub volume: Option<f64>,
    /// Rank direction: below or above
    #[arg(long)]
    pub direction: Option<Direction>,
    /// Output file path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct MatchInput {
    #[serde(default)]
    source: Option<Vec<f64>>,
    #[serde(default)]
    densities: Option<Vec<f64>>,
    reference: Reference,
}

#[derive(Debug, Serialize)]
struct MatchReport {
    densities: Vec<f64>,
    values: Vec<f64>,
}

pub(crate) fn run(arg: &AbundanceArg) -> anyhow::Result<()> {
    let mut options: MatchOptions =
        read_config_or_default("matching options", arg.config.as_deref())?;
    if let Some(volume) = arg.volume {
        options.volume = volume;
    }
    if let Some(direction) = arg.direction {
        options.direction = direction;
    }

    let input: MatchInput = read_json_file("abundance input", &arg.input)?;
    let report = match_input(input, &options)?;
    save_json(&report, arg.output.as_deref())
}

fn match_input(input: MatchInput, options: &MatchOptions) -> anyhow::Result<MatchReport> {
    let densities = match (input.source, input.densities) {
        (Some(source), None) => {
            eprintln!(
                "Computing cumulative densities of {} values (volume: {}, direction: {})...",
                source.len(),
                options.volume,
                options.direction
            );
            cumulative_density(&source, options.volume, options.direction)?
        }
        (None, Some(densities)) => densities,
        (Some(_), Some(_)) => bail!("Input must contain either `source` or `densities`, not both"),
        (None, None) => bail!("Input must contain `source` or `densities`"),
    };

    eprintln!(
        "Matching {} densities against {} reference points...",
        densities.len(),
        input.reference.densities.len()
    );
    let values = abundance_match_densities(&densities, &input.reference)?;
    Ok(MatchReport { densities, values })
}
