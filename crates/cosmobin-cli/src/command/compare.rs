use std::path::PathBuf;

use clap::Args;
use cosmobin_stats::binned::{BinningOptions, PairedBinnedStats, binned_statistics_pair};
use serde::Deserialize;

use crate::util::{read_json_file, save_json};

use super::bin::{BinningArgs, report};

#[derive(Debug, Clone, Args)]
pub(crate) struct CompareArg {
    /// JSON file with `x1`, `y1`, `x2` and `y2` arrays
    pub input: PathBuf,
    #[clap(flatten)]
    pub binning: BinningArgs,
    /// Output file path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct PairedSample {
    x1: Vec<f64>,
    y1: Vec<f64>,
    x2: Vec<f64>,
    y2: Vec<f64>,
}

pub(crate) fn run(arg: &CompareArg) -> anyhow::Result<()> {
    let options = arg.binning.options()?;
    let sample: PairedSample = read_json_file("paired sample", &arg.input)?;
    let paired = compare(&sample, &options)?;
    save_json(&paired, arg.output.as_deref())
}

fn compare(sample: &PairedSample, options: &BinningOptions) -> anyhow::Result<PairedBinnedStats> {
    eprintln!(
        "Binning {} + {} samples against shared edges of width {}...",
        sample.x1.len(),
        sample.x2.len(),
        options.base
    );
    let paired = binned_statistics_pair(
        (sample.x1.as_slice(), sample.y1.as_slice()),
        (sample.x2.as_slice(), sample.y2.as_slice()),
        options,
    )?;
    report(&paired.first);
    report(&paired.second);
    Ok(paired)
}
