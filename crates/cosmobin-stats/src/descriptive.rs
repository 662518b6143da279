use serde::{Deserialize, Serialize};

/// Descriptive statistics summarizing the members of one bin.
///
/// Dispersion uses the population convention (divide by `n`), which is what
/// the standard-error formula of the binning engine expects. A NaN member
/// makes the mean, median, variance and standard deviation NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// Number of values.
    pub count: usize,
    /// The smallest value.
    pub min: f64,
    /// The largest value.
    pub max: f64,
    /// The arithmetic mean.
    pub mean: f64,
    /// The median. Even-length datasets average the two middle values.
    pub median: f64,
    /// The population variance.
    pub variance: f64,
    /// The population standard deviation.
    pub std_dev: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use cosmobin_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 4.0);
    /// assert_eq!(stats.mean, 2.5);
    /// assert_eq!(stats.median, 2.5);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// Values must be ordered by [`f64::total_cmp`], which places NaN at the
    /// ends.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a.total_cmp(b).is_le()),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let variance = sorted_values
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / n;

        Some(Self {
            count,
            min,
            max,
            mean,
            median: sorted_median(sorted_values),
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

/// Reducer applied to the contents of a bin.
///
/// Parses case-insensitively from its name (`"mean"`, `"median"`).
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
pub enum Statistic {
    #[default]
    #[display("mean")]
    Mean,
    #[display("median")]
    Median,
}

impl Statistic {
    /// Ratio between the sampling error of the median and that of the mean
    /// for approximately normal data.
    pub const MEDIAN_ERROR_FACTOR: f64 = 1.253;

    /// Applies the reducer to `values`. Returns NaN for an empty slice.
    ///
    /// # Examples
    ///
    /// ```
    /// # use cosmobin_stats::descriptive::Statistic;
    /// assert_eq!(Statistic::Mean.apply(&[1.0, 2.0, 6.0]), 3.0);
    /// assert_eq!(Statistic::Median.apply(&[1.0, 2.0, 6.0]), 2.0);
    /// ```
    #[must_use]
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            Statistic::Mean => mean(values),
            Statistic::Median => median(values),
        }
    }

    /// Picks this statistic out of precomputed descriptive statistics.
    #[must_use]
    pub fn select(self, stats: &DescriptiveStats) -> f64 {
        match self {
            Statistic::Mean => stats.mean,
            Statistic::Median => stats.median,
        }
    }

    /// Scale applied to `std / sqrt(n)` to get the standard error of this statistic.
    #[must_use]
    pub fn error_factor(self) -> f64 {
        match self {
            Statistic::Mean => 1.0,
            Statistic::Median => Self::MEDIAN_ERROR_FACTOR,
        }
    }
}

/// Arithmetic mean. NaN for an empty slice.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median. NaN for an empty slice or when any value is NaN.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted_median(&sorted)
}

/// Population standard deviation. NaN for an empty slice.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    let mean = mean(values);
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Mean over the non-NaN values.
#[must_use]
pub fn nan_mean(values: &[f64]) -> f64 {
    mean(&without_nan(values))
}

/// Population standard deviation over the non-NaN values.
#[must_use]
pub fn nan_std_dev(values: &[f64]) -> f64 {
    std_dev(&without_nan(values))
}

fn without_nan(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| !v.is_nan()).collect()
}

fn sorted_median(sorted_values: &[f64]) -> f64 {
    let n = sorted_values.len();
    match n {
        _ if sorted_values.iter().any(|v| v.is_nan()) => f64::NAN,
        0 => f64::NAN,
        _ if n % 2 == 1 => sorted_values[n / 2],
        _ => 0.5 * (sorted_values[n / 2 - 1] + sorted_values[n / 2]),
    }
}
