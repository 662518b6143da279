//! Binned statistics of paired samples
//!
//! X is cut into fixed-width bins (see [`crate::edges`]) and the Y values of
//! every bin are summarized by a central statistic, their standard deviation
//! and the standard error of the statistic. Bins that do not reach the
//! population threshold are left out, so every output column only describes
//! populated bins and all columns stay index-aligned.
//!
//! # Population threshold
//!
//! A bin is kept when its member count is strictly greater than
//! `min_count - 1` (or `0` when `min_count` is zero). In other words
//! `min_count` of 0 and 1 both keep every non-empty bin, and larger values
//! require at least `min_count` members.
//!
//! # Examples
//!
//! ```
//! use cosmobin_stats::binned::{BinningOptions, binned_statistics};
//!
//! let x = [1.0, 2.0, 3.0, 11.0, 12.0, 13.0];
//! let y = [10.0, 20.0, 30.0, 110.0, 120.0, 130.0];
//! let options = BinningOptions {
//!     base: 10.0,
//!     ..BinningOptions::default()
//! };
//!
//! let stats = binned_statistics(&x, &y, &options).unwrap();
//! assert_eq!(stats.x_values(), vec![2.0, 12.0]);
//! assert_eq!(stats.y_values(), vec![20.0, 120.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    descriptive::{DescriptiveStats, Statistic},
    edges::{BinEdges, finite_range},
    error::{StatsError, ensure_non_empty, ensure_same_length},
    sigma::{SigmaBands, SigmaOptions, sigma_bands},
};

/// Where the X coordinate of a bin is reported.
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::FromStr,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum XPosition {
    /// The statistic of the X members of the bin.
    #[default]
    #[display("average")]
    Average,
    /// The left edge of the bin.
    #[display("left")]
    Left,
    /// The right edge of the bin.
    #[display("right")]
    Right,
}

/// Options controlling [`binned_statistics`] and [`binned_statistics_pair`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningOptions {
    /// Bin width in units of X.
    pub base: f64,
    /// Population threshold; see the module documentation.
    pub min_count: usize,
    pub statistic: Statistic,
    pub x_position: XPosition,
    /// Keep the raw X and Y members of each retained bin.
    pub keep_members: bool,
    /// Compute confidence bands over the Y members of each retained bin.
    pub sigma: Option<SigmaOptions>,
}

impl Default for BinningOptions {
    fn default() -> Self {
        Self {
            base: 1.0,
            min_count: 0,
            statistic: Statistic::default(),
            x_position: XPosition::default(),
            keep_members: false,
            sigma: None,
        }
    }
}

impl BinningOptions {
    /// Member count a bin must exceed to be kept.
    #[must_use]
    pub fn population_threshold(&self) -> usize {
        self.min_count.saturating_sub(1)
    }
}

/// Raw members of one bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinMembers {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Summary of one retained bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinSummary {
    /// 1-based index of the bin in the edge set.
    pub bin: usize,
    pub count: usize,
    /// X representative, chosen by [`XPosition`].
    pub x: f64,
    /// The statistic of the Y members.
    pub y: f64,
    /// Population standard deviation of the Y members.
    pub y_std: f64,
    /// Standard error of `y`.
    pub y_std_err: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<BinMembers>,
}

/// Result of binning one population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinnedStats {
    pub edges: BinEdges,
    pub bins: Vec<BinSummary>,
    /// Bands over Y members, one entry per retained bin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigma: Option<SigmaBands>,
}

impl BinnedStats {
    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    #[must_use]
    pub fn x_values(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.x).collect()
    }

    #[must_use]
    pub fn y_values(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.y).collect()
    }

    #[must_use]
    pub fn y_std(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.y_std).collect()
    }

    #[must_use]
    pub fn y_std_err(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.y_std_err).collect()
    }

    /// X members of every retained bin, or `None` if members were not kept.
    #[must_use]
    pub fn x_members(&self) -> Option<Vec<&[f64]>> {
        self.bins
            .iter()
            .map(|b| b.members.as_ref().map(|m| m.x.as_slice()))
            .collect()
    }

    /// Y members of every retained bin, or `None` if members were not kept.
    #[must_use]
    pub fn y_members(&self) -> Option<Vec<&[f64]>> {
        self.bins
            .iter()
            .map(|b| b.members.as_ref().map(|m| m.y.as_slice()))
            .collect()
    }

    /// Only the raw members of every retained bin, dropping the summaries.
    #[must_use]
    pub fn members_only(&self) -> Option<Vec<&BinMembers>> {
        self.bins.iter().map(|b| b.members.as_ref()).collect()
    }
}

/// Result of binning two populations against one shared edge set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedBinnedStats {
    pub first: BinnedStats,
    pub second: BinnedStats,
}

impl PairedBinnedStats {
    /// The edge set shared by both populations.
    #[must_use]
    pub fn edges(&self) -> &BinEdges {
        &self.first.edges
    }
}

/// Bins `y` by `x` and summarizes each bin.
///
/// # Errors
///
/// Fails if either sample is empty, if their lengths differ, if X holds a
/// non-finite value or if the options are invalid.
pub fn binned_statistics(
    x: &[f64],
    y: &[f64],
    options: &BinningOptions,
) -> Result<BinnedStats, StatsError> {
    validate_pair(("x", x), ("y", y))?;
    validate_options(options)?;
    let edges = BinEdges::new(x, options.base)?;
    aggregate(edges, x, y, options)
}

/// Bins two populations against shared edges spanning both X samples.
///
/// Bin `i` of the first population and bin `i` of the second cover the same
/// X interval, so the results can be compared bin by bin through
/// [`BinSummary::bin`].
pub fn binned_statistics_pair(
    (x1, y1): (&[f64], &[f64]),
    (x2, y2): (&[f64], &[f64]),
    options: &BinningOptions,
) -> Result<PairedBinnedStats, StatsError> {
    validate_pair(("x1", x1), ("y1", y1))?;
    validate_pair(("x2", x2), ("y2", y2))?;
    validate_options(options)?;

    let (min1, max1) = finite_range("x1", x1)?;
    let (min2, max2) = finite_range("x2", x2)?;
    let edges = BinEdges::spanning(f64::min(min1, min2), f64::max(max1, max2), options.base)?;

    let first = aggregate(edges.clone(), x1, y1, options)?;
    let second = aggregate(edges, x2, y2, options)?;
    Ok(PairedBinnedStats { first, second })
}

fn validate_pair(
    x: (&'static str, &[f64]),
    y: (&'static str, &[f64]),
) -> Result<(), StatsError> {
    ensure_non_empty(x.0, x.1)?;
    ensure_non_empty(y.0, y.1)?;
    ensure_same_length(x, y)
}

fn validate_options(options: &BinningOptions) -> Result<(), StatsError> {
    if let Some(sigma) = &options.sigma {
        sigma.validate()?;
    }
    Ok(())
}

#[expect(clippy::cast_precision_loss)]
fn aggregate(
    edges: BinEdges,
    x: &[f64],
    y: &[f64],
    options: &BinningOptions,
) -> Result<BinnedStats, StatsError> {
    let num_bins = edges.num_bins();
    let mut groups = vec![(vec![], vec![]); num_bins];
    for (bin, (&xv, &yv)) in edges.digitize(x).into_iter().zip(x.iter().zip(y)) {
        if (1..=num_bins).contains(&bin) {
            let (bx, by) = &mut groups[bin - 1];
            bx.push(xv);
            by.push(yv);
        }
    }

    let threshold = options.population_threshold();
    let kept = groups
        .into_iter()
        .enumerate()
        .filter(|(_, (bx, _))| bx.len() > threshold)
        .map(|(i, (bx, by))| (i + 1, bx, by))
        .collect::<Vec<_>>();
    tracing::debug!(
        num_bins,
        kept = kept.len(),
        threshold,
        "applied bin population threshold"
    );

    let sigma = options
        .sigma
        .as_ref()
        .map(|sigma| {
            let members = kept.iter().map(|(_, _, by)| by).collect::<Vec<_>>();
            sigma_bands(&members, sigma)
        })
        .transpose()?;

    let bins = kept
        .into_iter()
        .filter_map(|(bin, bx, by)| {
            let y_stats = DescriptiveStats::new(by.iter().copied())?;
            let x = match options.x_position {
                XPosition::Average => options.statistic.apply(&bx),
                XPosition::Left => edges.bin_bounds(bin).0,
                XPosition::Right => edges.bin_bounds(bin).1,
            };
            let y_std = y_stats.std_dev;
            let y_std_err =
                y_std / (y_stats.count as f64).sqrt() * options.statistic.error_factor();
            Some(BinSummary {
                bin,
                count: y_stats.count,
                x,
                y: options.statistic.select(&y_stats),
                y_std,
                y_std_err,
                members: options
                    .keep_members
                    .then_some(BinMembers { x: bx, y: by }),
            })
        })
        .collect();

    Ok(BinnedStats { edges, bins, sigma })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sigma::SigmaMode;

    const X: [f64; 6] = [1.0, 2.0, 3.0, 11.0, 12.0, 13.0];
    const Y: [f64; 6] = [10.0, 20.0, 30.0, 110.0, 120.0, 130.0];

    fn options(base: f64) -> BinningOptions {
        BinningOptions {
            base,
            ..BinningOptions::default()
        }
    }

    fn assert_close(actual: &[f64], expected: &[f64], tol: f64) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < tol, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn test_two_bins_with_mean() {
        let stats = binned_statistics(&X, &Y, &options(10.0)).unwrap();
        assert_eq!(stats.edges.as_slice(), &[0.0, 10.0, 20.0]);
        assert_eq!(stats.len(), 2);
        assert_close(&stats.x_values(), &[2.0, 12.0], 1e-12);
        assert_close(&stats.y_values(), &[20.0, 120.0], 1e-12);
        assert_close(&stats.y_std(), &[8.164_965_8, 8.164_965_8], 1e-6);
        assert_close(&stats.y_std_err(), &[4.714_045_2, 4.714_045_2], 1e-6);
        assert!(stats.bins.iter().all(|b| b.count == 3));
        assert!(stats.members_only().is_none());
    }

    #[test]
    fn test_median_error_is_scaled() {
        let mean = binned_statistics(&X, &Y, &options(10.0)).unwrap();
        let median = binned_statistics(
            &X,
            &Y,
            &BinningOptions {
                statistic: Statistic::Median,
                ..options(10.0)
            },
        )
        .unwrap();
        for (m, md) in mean.bins.iter().zip(&median.bins) {
            assert_eq!(md.y_std_err, m.y_std_err * 1.253);
            assert_eq!(md.y_std, m.y_std);
        }
        assert_eq!(median.y_values(), vec![20.0, 120.0]);
    }

    #[test]
    fn test_x_position_edges() {
        let left = binned_statistics(
            &X,
            &Y,
            &BinningOptions {
                x_position: XPosition::Left,
                ..options(10.0)
            },
        )
        .unwrap();
        assert_eq!(left.x_values(), vec![0.0, 10.0]);

        let right = binned_statistics(
            &X,
            &Y,
            &BinningOptions {
                x_position: XPosition::Right,
                ..options(10.0)
            },
        )
        .unwrap();
        assert_eq!(right.x_values(), vec![10.0, 20.0]);
    }

    #[test]
    fn test_sparse_bins_are_dropped_and_compacted() {
        let x = [1.0, 2.0, 25.0, 41.0, 42.0, 43.0];
        let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let opts = BinningOptions {
            min_count: 2,
            keep_members: true,
            ..options(10.0)
        };
        let stats = binned_statistics(&x, &y, &opts).unwrap();
        assert_eq!(stats.edges.num_bins(), 5);
        assert_eq!(stats.bins.iter().map(|b| b.bin).collect::<Vec<_>>(), vec![1, 5]);
        assert_eq!(stats.y_values(), vec![1.5, 5.0]);
        let y_members = stats.y_members().unwrap();
        assert_eq!(y_members, vec![&[1.0, 2.0][..], &[4.0, 5.0, 6.0][..]]);
        let x_members = stats.x_members().unwrap();
        assert_eq!(x_members[1], &[41.0, 42.0, 43.0]);
    }

    #[test]
    fn test_threshold_off_by_one() {
        let x = [1.0, 11.0, 12.0];
        let y = [1.0, 2.0, 3.0];
        let count_for = |min_count| {
            let opts = BinningOptions {
                min_count,
                ..options(10.0)
            };
            binned_statistics(&x, &y, &opts).unwrap().len()
        };
        assert_eq!(count_for(0), 2);
        assert_eq!(count_for(1), 2);
        assert_eq!(count_for(2), 1);
        assert_eq!(count_for(3), 0);
    }

    #[test]
    fn test_threshold_monotonic() {
        let x = (0..200).map(|i| f64::from(i % 37) * 1.3).collect::<Vec<_>>();
        let y = (0..200).map(f64::from).collect::<Vec<_>>();
        let mut previous = usize::MAX;
        for min_count in 0..12 {
            let opts = BinningOptions {
                min_count,
                ..options(5.0)
            };
            let retained = binned_statistics(&x, &y, &opts).unwrap().len();
            assert!(retained <= previous);
            previous = retained;
        }
    }

    #[test]
    fn test_idempotent() {
        let opts = BinningOptions {
            keep_members: true,
            sigma: Some(SigmaOptions::default()),
            ..options(5.0)
        };
        let first = binned_statistics(&X, &Y, &opts).unwrap();
        let second = binned_statistics(&X, &Y, &opts).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_element() {
        let stats = binned_statistics(&[10.0], &[3.0], &options(10.0)).unwrap();
        assert_eq!(stats.edges.as_slice(), &[10.0]);
        assert_eq!(stats.len(), 1);
        let bin = &stats.bins[0];
        assert_eq!((bin.x, bin.y, bin.y_std, bin.y_std_err), (10.0, 3.0, 0.0, 0.0));

        let stats = binned_statistics(&[4.0], &[3.0], &options(10.0)).unwrap();
        assert_eq!(stats.len(), 1);
    }

    #[test]
    fn test_sigma_bands_follow_retained_bins() {
        let x = [1.0, 2.0, 3.0, 4.0, 25.0, 41.0, 42.0];
        let y = [1.0, 2.0, 3.0, 4.0, 100.0, 10.0, 20.0];
        let opts = BinningOptions {
            min_count: 2,
            sigma: Some(SigmaOptions {
                mode: SigmaMode::Percentile,
                widths: vec![100.0],
            }),
            ..options(10.0)
        };
        let stats = binned_statistics(&x, &y, &opts).unwrap();
        let sigma = stats.sigma.unwrap();
        assert_eq!(sigma.num_bins(), 2);
        assert_eq!(sigma.bounds(0, 0), (1.0, 4.0));
        assert_eq!(sigma.bounds(0, 1), (10.0, 20.0));
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(
            binned_statistics(&[], &[], &options(1.0)),
            Err(StatsError::EmptyInput { name: "x" })
        );
        assert_eq!(
            binned_statistics(&[1.0, 2.0], &[1.0], &options(1.0)),
            Err(StatsError::LengthMismatch {
                x_name: "x",
                y_name: "y",
                x_len: 2,
                y_len: 1
            })
        );
        assert_eq!(
            binned_statistics(&[1.0], &[1.0], &options(-1.0)),
            Err(StatsError::InvalidBinWidth { base: -1.0 })
        );
    }

    #[test]
    fn test_pair_shares_edges() {
        let x2 = [5.0, 6.0, 35.0];
        let y2 = [1.0, 2.0, 3.0];
        let paired = binned_statistics_pair((&X, &Y), (&x2, &y2), &options(10.0)).unwrap();
        assert_eq!(paired.edges().as_slice(), &[0.0, 10.0, 20.0, 30.0, 40.0]);
        assert_eq!(paired.first.edges, paired.second.edges);
        assert_eq!(
            paired.first.bins.iter().map(|b| b.bin).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(
            paired.second.bins.iter().map(|b| b.bin).collect::<Vec<_>>(),
            vec![1, 4]
        );
        assert_eq!(paired.second.y_values(), vec![1.5, 3.0]);
    }

    #[test]
    fn test_pair_rejects_empty_second_population() {
        assert_eq!(
            binned_statistics_pair((&X, &Y), (&[], &[]), &options(10.0)),
            Err(StatsError::EmptyInput { name: "x2" })
        );
    }

    #[test]
    fn test_nan_in_y_propagates() {
        let opts = BinningOptions {
            sigma: Some(SigmaOptions {
                mode: SigmaMode::Percentile,
                widths: vec![100.0],
            }),
            ..options(10.0)
        };
        let stats = binned_statistics(&[1.0, 2.0, 3.0], &[1.0, f64::NAN, 3.0], &opts).unwrap();
        assert_eq!(stats.len(), 1);
        let bin = &stats.bins[0];
        assert_eq!((bin.count, bin.x), (3, 2.0));
        assert!(bin.y.is_nan() && bin.y_std.is_nan() && bin.y_std_err.is_nan());
        assert_eq!(stats.sigma.unwrap().bounds(0, 0), (1.0, 3.0));

        let median = BinningOptions {
            statistic: Statistic::Median,
            ..options(10.0)
        };
        let stats = binned_statistics(&[1.0, 2.0], &[f64::NAN, 4.0], &median).unwrap();
        assert!(stats.bins[0].y.is_nan());
    }

    #[test]
    fn test_pair_nan_in_y_propagates() {
        let paired = binned_statistics_pair(
            (&[1.0, 2.0], &[1.0, 2.0]),
            (&[3.0, 14.0], &[f64::NAN, 5.0]),
            &options(10.0),
        )
        .unwrap();
        assert_eq!(paired.first.y_values(), vec![1.5]);
        assert!(paired.second.bins[0].y.is_nan());
        assert_eq!(paired.second.bins[1].y, 5.0);
    }

    #[test]
    fn test_pair_positions_and_members() {
        let x2 = [5.0, 6.0, 35.0];
        let y2 = [1.0, 2.0, 3.0];
        let paired_with = |x_position| {
            let opts = BinningOptions {
                x_position,
                keep_members: true,
                ..options(10.0)
            };
            binned_statistics_pair((&X, &Y), (&x2, &y2), &opts).unwrap()
        };

        let left = paired_with(XPosition::Left);
        assert_eq!(left.first.x_values(), vec![0.0, 10.0]);
        assert_eq!(left.second.x_values(), vec![0.0, 30.0]);

        let right = paired_with(XPosition::Right);
        assert_eq!(right.first.x_values(), vec![10.0, 20.0]);
        assert_eq!(right.second.x_values(), vec![10.0, 40.0]);
        assert_eq!(
            right.second.y_members().unwrap(),
            vec![&[1.0, 2.0][..], &[3.0][..]]
        );
        assert_eq!(right.first.x_members().unwrap()[1], &[11.0, 12.0, 13.0]);
        assert_eq!(right.second.members_only().unwrap().len(), 2);
    }

    #[test]
    fn test_oversized_range_is_rejected() {
        assert!(matches!(
            binned_statistics(&[0.0, 1e20], &[1.0, 2.0], &options(1.0)),
            Err(StatsError::TooManyBins { .. })
        ));
        assert!(matches!(
            binned_statistics_pair((&[0.0], &[1.0]), (&[1e20], &[2.0]), &options(1.0)),
            Err(StatsError::TooManyBins { .. })
        ));
    }

    #[test]
    fn test_options_from_partial_json() {
        let opts: BinningOptions =
            serde_json::from_str(r#"{ "base": 0.5, "statistic": "median" }"#).unwrap();
        assert_eq!(opts.base, 0.5);
        assert_eq!(opts.statistic, Statistic::Median);
        assert_eq!(opts.x_position, XPosition::Average);
        assert!(opts.sigma.is_none());
    }
}
