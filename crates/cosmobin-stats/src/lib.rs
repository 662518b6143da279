//! Binned statistics for paired survey samples.
//!
//! This crate provides the numeric core of the `cosmobin` tools:
//!
//! - **Bin edges**: fixed-width edges aligned to multiples of the bin width, and digitization
//! - **Binned statistics**: per-bin central statistic, dispersion and standard error of Y versus X,
//!   for one population or two populations sharing edges
//! - **Sigma bands**: percentile or standard-deviation bands over ragged per-bin members
//! - **Bootstrap**: confidence intervals of a statistic by resampling with replacement
//! - **Abundance matching**: rank-order matching through cumulative number densities
//!
//! # Modules
//!
//! - [`edges`]: Bin-edge generation and digitization
//! - [`binned`]: Per-bin aggregation
//! - [`sigma`]: Percentile and standard-deviation bands
//! - [`bootstrap`]: Bootstrap confidence intervals
//! - [`abundance`]: Cumulative densities and abundance matching
//! - [`descriptive`]: Descriptive statistics and the [`Statistic`](descriptive::Statistic) reducer
//! - [`percentiles`]: NaN-aware linear-interpolation percentiles
//!
//! # Examples
//!
//! ## Binning Y by X
//!
//! ```
//! use cosmobin_stats::binned::{BinningOptions, binned_statistics};
//! use cosmobin_stats::descriptive::Statistic;
//!
//! let x = [1.0, 2.0, 3.0, 11.0, 12.0, 13.0];
//! let y = [10.0, 20.0, 30.0, 110.0, 120.0, 130.0];
//! let options = BinningOptions {
//!     base: 10.0,
//!     statistic: Statistic::Median,
//!     ..BinningOptions::default()
//! };
//! let stats = binned_statistics(&x, &y, &options).unwrap();
//! assert_eq!(stats.y_values(), vec![20.0, 120.0]);
//! ```
//!
//! ## Comparing two populations
//!
//! ```
//! use cosmobin_stats::binned::{BinningOptions, binned_statistics_pair};
//!
//! let options = BinningOptions {
//!     base: 5.0,
//!     ..BinningOptions::default()
//! };
//! let paired = binned_statistics_pair(
//!     (&[1.0, 2.0], &[1.0, 1.0]),
//!     (&[8.0, 9.0], &[2.0, 2.0]),
//!     &options,
//! )
//! .unwrap();
//! assert_eq!(paired.edges().as_slice(), &[0.0, 5.0, 10.0]);
//! ```
//!
//! ## Bootstrap confidence interval
//!
//! ```
//! use cosmobin_stats::bootstrap::{BootstrapOptions, ResampleSeed, bootstrap_ci};
//! use cosmobin_stats::descriptive::median;
//!
//! let options = BootstrapOptions {
//!     n_samples: 500,
//!     seed: Some(ResampleSeed::from_u128(7)),
//!     ..BootstrapOptions::default()
//! };
//! let ci = bootstrap_ci(&[1.0, 2.0, 3.0, 4.0], median, &options).unwrap();
//! ```

pub mod abundance;
pub mod binned;
pub mod bootstrap;
pub mod descriptive;
pub mod edges;
mod error;
pub mod percentiles;
pub mod sigma;

pub use self::error::StatsError;
