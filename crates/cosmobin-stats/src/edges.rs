//! Fixed-width bin edges and sample digitization
//!
//! Edges are aligned to multiples of the bin width: the first edge is the
//! largest multiple of `base` not above the data minimum, the last edge the
//! smallest multiple not below the data maximum.
//!
//! # Examples
//!
//! ```
//! use cosmobin_stats::edges::BinEdges;
//!
//! let edges = BinEdges::new(&[1.0, 2.0, 13.0], 10.0).unwrap();
//! assert_eq!(edges.as_slice(), &[0.0, 10.0, 20.0]);
//! assert_eq!(edges.num_bins(), 2);
//!
//! // 1-based bin indices
//! assert_eq!(edges.digitize(&[1.0, 2.0, 13.0]), vec![1, 1, 2]);
//! ```

use serde::Serialize;

use crate::error::{StatsError, ensure_non_empty};

/// Largest number of bins an edge set may describe.
pub const MAX_BINS: usize = 1 << 20;

/// Rounds `x` down to a multiple of `base`.
///
/// ```
/// # use cosmobin_stats::edges::floor_to_base;
/// assert_eq!(floor_to_base(12.0, 5.0), 10.0);
/// assert_eq!(floor_to_base(-3.0, 10.0), -10.0);
/// ```
#[must_use]
pub fn floor_to_base(x: f64, base: f64) -> f64 {
    base * (x / base).floor()
}

/// Rounds `x` up to a multiple of `base`.
///
/// ```
/// # use cosmobin_stats::edges::ceil_to_base;
/// assert_eq!(ceil_to_base(12.0, 10.0), 20.0);
/// assert_eq!(ceil_to_base(20.0, 10.0), 20.0);
/// ```
#[must_use]
pub fn ceil_to_base(x: f64, base: f64) -> f64 {
    base * (x / base).ceil()
}

/// Monotonically increasing bin edges with a fixed step.
///
/// Bins are numbered from 1. Bin `i` covers `[edges[i - 1], edges[i])`, except
/// the last bin which also contains its upper edge. A single-edge set (all data
/// on one multiple of the width) describes one zero-width bin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinEdges {
    base: f64,
    edges: Vec<f64>,
}

impl BinEdges {
    /// Builds edges covering every value in `values`.
    pub fn new(values: &[f64], base: f64) -> Result<Self, StatsError> {
        let (min, max) = finite_range("values", values)?;
        Self::spanning(min, max, base)
    }

    /// Builds edges covering the closed interval `[min, max]`.
    ///
    /// Fails when the range needs more than [`MAX_BINS`] bins, or when `base`
    /// is too small for neighbouring edges to differ at the magnitude of the
    /// data.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn spanning(min: f64, max: f64, base: f64) -> Result<Self, StatsError> {
        if !base.is_finite() || base <= 0.0 {
            return Err(StatsError::InvalidBinWidth { base });
        }
        if !min.is_finite() || !max.is_finite() {
            return Err(StatsError::NonFiniteInput { name: "bounds" });
        }
        if min > max {
            return Err(StatsError::InvalidBounds { min, max });
        }

        // Work in units of `base` so the outer edges equal floor/ceil exactly.
        let mut first_step = (min / base).floor();
        let mut last_step = (max / base).ceil();
        if base * first_step > min {
            first_step -= 1.0;
        }
        if base * last_step < max {
            last_step += 1.0;
        }
        let bins = last_step - first_step;
        if bins.is_nan() || bins > MAX_BINS as f64 {
            return Err(StatsError::TooManyBins {
                bins,
                limit: MAX_BINS,
            });
        }
        let steps = bins as usize;
        let edges = (0..=steps)
            .map(|i| base * (first_step + i as f64))
            .collect::<Vec<_>>();
        if let Some(w) = edges.windows(2).find(|w| w[0] >= w[1]) {
            return Err(StatsError::UnresolvableBinWidth { base, value: w[0] });
        }

        tracing::debug!(
            base,
            first = edges[0],
            last = edges[edges.len() - 1],
            num_edges = edges.len(),
            "generated bin edges"
        );
        Ok(Self { base, edges })
    }

    /// Bin width.
    #[must_use]
    pub fn base(&self) -> f64 {
        self.base
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.edges
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// An edge set built by [`Self::new`] or [`Self::spanning`] is never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of bins. A degenerate single-edge set has one zero-width bin.
    #[must_use]
    pub fn num_bins(&self) -> usize {
        usize::max(self.edges.len() - 1, 1)
    }

    /// Left and right edge of the 1-based bin `bin`.
    ///
    /// # Panics
    ///
    /// Panics if `bin` is not in `1..=num_bins()`.
    #[must_use]
    pub fn bin_bounds(&self, bin: usize) -> (f64, f64) {
        assert!(
            (1..=self.num_bins()).contains(&bin),
            "bin index {bin} out of range 1..={}",
            self.num_bins()
        );
        if self.edges.len() == 1 {
            (self.edges[0], self.edges[0])
        } else {
            (self.edges[bin - 1], self.edges[bin])
        }
    }

    /// Bin index of one value.
    ///
    /// Returns 0 below the first edge and `len()` above the last edge (or for
    /// NaN); values in range get `1..=num_bins()`.
    #[must_use]
    pub fn bin_index(&self, value: f64) -> usize {
        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];
        if value < first {
            0
        } else if value == last {
            self.num_bins()
        } else if value > last || value.is_nan() {
            self.edges.len()
        } else {
            self.edges.partition_point(|&edge| edge <= value)
        }
    }

    /// Bin index of every value, in input order.
    #[must_use]
    pub fn digitize(&self, values: &[f64]) -> Vec<usize> {
        values.iter().map(|&v| self.bin_index(v)).collect()
    }
}

pub(crate) fn finite_range(name: &'static str, values: &[f64]) -> Result<(f64, f64), StatsError> {
    ensure_non_empty(name, values)?;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(StatsError::NonFiniteInput { name });
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok((min, max))
}
