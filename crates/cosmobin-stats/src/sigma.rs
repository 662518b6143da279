//! Confidence bands over ragged per-bin member arrays
//!
//! Each band width is a percentage of the distribution centred on the median
//! (percentile mode) or a multiple of the standard deviation around the mean
//! (standard-deviation mode). Bins may hold different numbers of members.
//!
//! # Examples
//!
//! ```
//! use cosmobin_stats::sigma::{SigmaOptions, sigma_bands};
//!
//! let bins = vec![vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![10.0, 20.0]];
//! let bands = sigma_bands(&bins, &SigmaOptions::default()).unwrap();
//!
//! // 3 widths x (low, high) x 2 bins
//! assert_eq!(bands.num_widths(), 3);
//! assert_eq!(bands.num_bins(), 2);
//! let (low, high) = bands.bounds(0, 1);
//! assert!(low > 10.0 && high < 20.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::{
    descriptive::{nan_mean, nan_std_dev},
    error::StatsError,
    percentiles::nan_percentiles,
};

/// Percentage widths equivalent to 1, 2 and 3 sigma of a normal distribution.
pub const DEFAULT_WIDTHS: [f64; 3] = [68.0, 95.0, 99.7];

/// How band bounds are derived from the members of a bin.
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
pub enum SigmaMode {
    /// `50 - w/2` and `50 + w/2` percentiles, NaN ignored.
    #[default]
    #[display("percentile")]
    Percentile,
    /// `mean ± k * std` for the k-th requested width (k = 1, 2, 3, ...).
    #[display("std")]
    Std,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigmaOptions {
    pub mode: SigmaMode,
    /// Percentage widths. In [`SigmaMode::Std`] only their count matters.
    pub widths: Vec<f64>,
}

impl Default for SigmaOptions {
    fn default() -> Self {
        Self {
            mode: SigmaMode::default(),
            widths: DEFAULT_WIDTHS.to_vec(),
        }
    }
}

impl SigmaOptions {
    pub fn validate(&self) -> Result<(), StatsError> {
        if self.widths.is_empty() {
            return Err(StatsError::EmptyWidths);
        }
        if let Some(&width) = self
            .widths
            .iter()
            .find(|w| !(w.is_finite() && **w > 0.0 && **w <= 100.0))
        {
            return Err(StatsError::InvalidWidth { width });
        }
        Ok(())
    }
}

/// Band bounds indexed `[width][0 = low, 1 = high][bin]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SigmaBands {
    limits: Vec<[Vec<f64>; 2]>,
}

impl SigmaBands {
    #[must_use]
    pub fn num_widths(&self) -> usize {
        self.limits.len()
    }

    #[must_use]
    pub fn num_bins(&self) -> usize {
        self.limits.first().map_or(0, |[low, _]| low.len())
    }

    /// Lower bounds of every bin for one width.
    #[must_use]
    pub fn low(&self, width_idx: usize) -> &[f64] {
        &self.limits[width_idx][0]
    }

    /// Upper bounds of every bin for one width.
    #[must_use]
    pub fn high(&self, width_idx: usize) -> &[f64] {
        &self.limits[width_idx][1]
    }

    /// `(low, high)` for one width and one (0-based) bin.
    #[must_use]
    pub fn bounds(&self, width_idx: usize, bin_idx: usize) -> (f64, f64) {
        let [low, high] = &self.limits[width_idx];
        (low[bin_idx], high[bin_idx])
    }

    #[must_use]
    pub fn as_slice(&self) -> &[[Vec<f64>; 2]] {
        &self.limits
    }
}

/// Computes confidence bands for every bin and every requested width.
///
/// Bins are processed one at a time, so their member counts may differ.
/// A bin with no non-NaN member yields NaN bounds.
#[expect(clippy::cast_precision_loss)]
pub fn sigma_bands<B>(bins: &[B], options: &SigmaOptions) -> Result<SigmaBands, StatsError>
where
    B: AsRef<[f64]>,
{
    options.validate()?;

    let points = options
        .widths
        .iter()
        .flat_map(|w| [50.0 - w / 2.0, 50.0 + w / 2.0])
        .collect::<Vec<_>>();
    let mut limits = vec![
        [
            Vec::with_capacity(bins.len()),
            Vec::with_capacity(bins.len())
        ];
        options.widths.len()
    ];
    for members in bins {
        let members = members.as_ref();
        match options.mode {
            SigmaMode::Percentile => {
                let values = nan_percentiles(members, &points);
                for (limit, pair) in limits.iter_mut().zip(values.chunks_exact(2)) {
                    limit[0].push(pair[0]);
                    limit[1].push(pair[1]);
                }
            }
            SigmaMode::Std => {
                let mean = nan_mean(members);
                let std = nan_std_dev(members);
                for (k, limit) in limits.iter_mut().enumerate() {
                    let spread = (k + 1) as f64 * std;
                    limit[0].push(mean - spread);
                    limit[1].push(mean + spread);
                }
            }
        }
    }

    Ok(SigmaBands { limits })
}
