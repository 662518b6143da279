use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{
    abundance::AbundanceArg, bin::BinArg, bootstrap::BootstrapArg, compare::CompareArg,
};

mod abundance;
mod bin;
mod bootstrap;
mod compare;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// What to compute
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Bin Y by X and summarize every bin
    Bin(#[clap(flatten)] BinArg),
    /// Bin two populations against shared edges
    Compare(#[clap(flatten)] CompareArg),
    /// Bootstrap confidence interval of a statistic
    Bootstrap(#[clap(flatten)] BootstrapArg),
    /// Assign reference values by matching cumulative densities
    Abundance(#[clap(flatten)] AbundanceArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::Bin(arg) => bin::run(&arg)?,
        Mode::Compare(arg) => compare::run(&arg)?,
        Mode::Bootstrap(arg) => bootstrap::run(&arg)?,
        Mode::Abundance(arg) => abundance::run(&arg)?,
    }
    Ok(())
}

/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
