/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between closest ranks: for `n` values the
/// fractional rank of the k-th percentile is `(n - 1) * k / 100`, and the
/// result interpolates between the two neighbouring order statistics.
///
/// # Arguments
///
/// * `sorted_values` - Values sorted in ascending order, without NaN
/// * `percentile` - The percentile to compute (0.0 to 100.0)
///
/// # Returns
///
/// The value at the specified percentile. Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use cosmobin_stats::percentiles::compute_percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(compute_percentile(&values, 50.0), 2.5);
/// assert_eq!(compute_percentile(&values, 0.0), 1.0);
/// assert_eq!(compute_percentile(&values, 100.0), 4.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let last = sorted_values.len() - 1;
    let rank = (last as f64 * percentile / 100.0).clamp(0.0, last as f64);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - rank.floor();
    let low_value = sorted_values[lower];
    let high_value = sorted_values[upper];
    if fraction == 0.0 {
        low_value
    } else {
        low_value + (high_value - low_value) * fraction
    }
}

/// Computes several percentiles of unsorted values, ignoring NaN.
///
/// Every requested percentile is NaN when no non-NaN value remains.
///
/// # Examples
///
/// ```
/// use cosmobin_stats::percentiles::nan_percentiles;
///
/// let values = [3.0, f64::NAN, 1.0, 2.0];
/// assert_eq!(nan_percentiles(&values, &[0.0, 50.0, 100.0]), vec![1.0, 2.0, 3.0]);
/// ```
#[must_use]
pub fn nan_percentiles(values: &[f64], percentile_points: &[f64]) -> Vec<f64> {
    let mut sorted = values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .collect::<Vec<_>>();
    sorted.sort_by(f64::total_cmp);
    percentile_points
        .iter()
        .map(|&p| compute_percentile(&sorted, p))
        .collect()
}
