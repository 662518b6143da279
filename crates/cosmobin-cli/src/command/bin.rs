use std::path::PathBuf;

use clap::Args;
use cosmobin_stats::{
    binned::{BinnedStats, BinningOptions, XPosition, binned_statistics},
    descriptive::Statistic,
    sigma::{SigmaMode, SigmaOptions},
};
use serde::Deserialize;

use crate::util::{read_config_or_default, read_json_file, save_json};

/// Binning flags shared by `bin` and `compare`.
///
/// Flags override the values read from `--config`.
#[derive(Default, Debug, Clone, Args)]
pub(crate) struct BinningArgs {
    /// JSON file with binning options
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Bin width in units of X
    #[arg(long)]
    pub base: Option<f64>,
    /// Minimum member count of a reported bin
    #[arg(long)]
    pub min_count: Option<usize>,
    /// Central statistic: mean or median
    #[arg(long)]
    pub statistic: Option<Statistic>,
    /// X representative of a bin: average, left or right
    #[arg(long)]
    pub x_position: Option<XPosition>,
    /// Include the raw members of every bin
    #[arg(long)]
    pub members: bool,
    /// Compute sigma bands: percentile or std
    #[arg(long)]
    pub sigma: Option<SigmaMode>,
    /// Percentage widths of the sigma bands
    #[arg(long, value_delimiter = ',')]
    pub widths: Option<Vec<f64>>,
}

impl BinningArgs {
    pub fn options(&self) -> anyhow::Result<BinningOptions> {
        let mut options: BinningOptions =
            read_config_or_default("binning options", self.config.as_deref())?;
        if let Some(base) = self.base {
            options.base = base;
        }
        if let Some(min_count) = self.min_count {
            options.min_count = min_count;
        }
        if let Some(statistic) = self.statistic {
            options.statistic = statistic;
        }
        if let Some(x_position) = self.x_position {
            options.x_position = x_position;
        }
        options.keep_members |= self.members;
        if self.sigma.is_some() || self.widths.is_some() {
            let sigma = options.sigma.get_or_insert_with(SigmaOptions::default);
            if let Some(mode) = self.sigma {
                sigma.mode = mode;
            }
            if let Some(widths) = &self.widths {
                sigma.widths.clone_from(widths);
            }
        }
        Ok(options)
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct BinArg {
    /// JSON file with `x` and `y` arrays
    pub input: PathBuf,
    #[clap(flatten)]
    pub binning: BinningArgs,
    /// Output only the raw members of every bin
    #[arg(long)]
    pub members_only: bool,
    /// Output file path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Sample {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl BinArg {
    fn options(&self) -> anyhow::Result<BinningOptions> {
        let mut options = self.binning.options()?;
        options.keep_members |= self.members_only;
        Ok(options)
    }
}

pub(crate) fn run(arg: &BinArg) -> anyhow::Result<()> {
    let options = arg.options()?;
    let sample: Sample = read_json_file("sample", &arg.input)?;
    eprintln!(
        "Binning {} samples with width {}...",
        sample.x.len(),
        options.base
    );
    let stats = binned_statistics(&sample.x, &sample.y, &options)?;
    report(&stats);

    let output = arg.output.as_deref();
    if arg.members_only {
        save_json(&stats.members_only(), output)
    } else {
        save_json(&stats, output)
    }
}

pub(crate) fn report(stats: &BinnedStats) {
    eprintln!(
        "Kept {} of {} bins",
        stats.len(),
        stats.edges.num_bins()
    );
}
