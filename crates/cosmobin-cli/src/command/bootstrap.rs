use std::path::PathBuf;

use clap::Args;
use cosmobin_stats::{
    bootstrap::{
        BootstrapMethod, BootstrapOptions, CiOutput, ConfidenceInterval, ResampleSeed,
        bootstrap_ci,
    },
    descriptive::Statistic,
};
use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::util::{read_config_or_default, read_json_file, save_json};

#[derive(Default, Debug, Clone, Args)]
pub(crate) struct BootstrapArg {
    /// JSON file with a `data` array
    pub input: PathBuf,
    /// JSON file with bootstrap options
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Statistic to bootstrap: mean or median
    #[arg(long, default_value = "mean")]
    pub statistic: Statistic,
    /// Number of resamples
    #[arg(long)]
    pub n_samples: Option<usize>,
    /// Two-sided significance level
    #[arg(long)]
    pub alpha: Option<f64>,
    /// Interval method: percentile or bca
    #[arg(long)]
    pub method: Option<BootstrapMethod>,
    /// Output shape: lowhigh or errorbar
    #[arg(long)]
    pub output_mode: Option<CiOutput>,
    /// Resampling seed as 32 hex digits
    #[arg(long)]
    pub seed: Option<ResampleSeed>,
    /// Output file path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Data {
    data: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct BootstrapReport {
    statistic: Statistic,
    point: f64,
    method: BootstrapMethod,
    alpha: f64,
    n_samples: usize,
    seed: ResampleSeed,
    interval: ConfidenceInterval,
}

impl BootstrapArg {
    /// Options from `--config` overridden by flags, always with a seed.
    fn options(&self) -> anyhow::Result<BootstrapOptions> {
        let mut options: BootstrapOptions =
            read_config_or_default("bootstrap options", self.config.as_deref())?;
        if let Some(n_samples) = self.n_samples {
            options.n_samples = n_samples;
        }
        if let Some(alpha) = self.alpha {
            options.alpha = alpha;
        }
        if let Some(method) = self.method {
            options.method = method;
        }
        if let Some(output) = self.output_mode {
            options.output = output;
        }
        let seed = self
            .seed
            .or(options.seed)
            .unwrap_or_else(|| rand::rng().random());
        options.seed = Some(seed);
        Ok(options)
    }
}

pub(crate) fn run(arg: &BootstrapArg) -> anyhow::Result<()> {
    let options = arg.options()?;
    let Data { data } = read_json_file("data", &arg.input)?;
    let report = bootstrap(arg.statistic, &data, &options)?;
    save_json(&report, arg.output.as_deref())
}

fn bootstrap(
    statistic: Statistic,
    data: &[f64],
    options: &BootstrapOptions,
) -> anyhow::Result<BootstrapReport> {
    let seed = options.seed.unwrap_or_else(|| rand::rng().random());
    let options = BootstrapOptions {
        seed: Some(seed),
        ..options.clone()
    };
    eprintln!(
        "Bootstrapping the {statistic} of {} values with {} resamples (seed: {seed})...",
        data.len(),
        options.n_samples
    );
    let interval = bootstrap_ci(data, |s| statistic.apply(s), &options)?;
    Ok(BootstrapReport {
        statistic,
        point: statistic.apply(data),
        method: options.method,
        alpha: options.alpha,
        n_samples: options.n_samples,
        seed,
        interval,
    })
}
