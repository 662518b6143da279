//! Bootstrap confidence intervals for a statistic of one sample
//!
//! The sample is resampled with replacement `n_samples` times and the
//! statistic is evaluated on every resample. The interval is read off the
//! sorted resample statistics, either directly at the `alpha / 2` and
//! `1 - alpha / 2` positions ([`BootstrapMethod::Percentile`]) or at
//! bias-corrected and accelerated positions ([`BootstrapMethod::Bca`]).
//!
//! # Examples
//!
//! ```
//! use cosmobin_stats::{
//!     bootstrap::{BootstrapOptions, ConfidenceInterval, CiOutput, bootstrap_ci},
//!     descriptive::Statistic,
//! };
//!
//! let data = [5.0; 20];
//! let options = BootstrapOptions {
//!     output: CiOutput::LowHigh,
//!     ..BootstrapOptions::default()
//! };
//! let ci = bootstrap_ci(&data, |s| Statistic::Mean.apply(s), &options).unwrap();
//! assert_eq!(ci, ConfidenceInterval::LowHigh { low: 5.0, high: 5.0 });
//! ```

use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use statrs::distribution::{ContinuousCDF as _, Normal};

use crate::{
    descriptive::mean,
    error::{StatsError, ensure_non_empty},
};

/// How interval bounds are located in the resample distribution.
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
pub enum BootstrapMethod {
    /// Plain percentile positions.
    #[default]
    #[display("percentile")]
    Percentile,
    /// Bias-corrected and accelerated positions.
    #[display("bca")]
    Bca,
}

/// Shape of the returned interval.
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
pub enum CiOutput {
    /// The bounds themselves.
    #[display("lowhigh")]
    LowHigh,
    /// Distances of the bounds from the statistic of the full sample.
    #[default]
    #[display("errorbar")]
    ErrorBar,
}

/// A bootstrap confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ConfidenceInterval {
    #[serde(rename = "lowhigh")]
    LowHigh { low: f64, high: f64 },
    #[serde(rename = "errorbar")]
    ErrorBar { minus: f64, plus: f64 },
}

/// Seed for reproducible resampling.
///
/// A 128-bit seed for the resampling generator, serialized as 32 hex digits.
///
/// ```
/// use cosmobin_stats::bootstrap::ResampleSeed;
///
/// let seed: ResampleSeed = "000000000000000000000000deadbeef".parse().unwrap();
/// assert_eq!(seed.to_string(), "000000000000000000000000deadbeef");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleSeed([u8; 16]);

impl ResampleSeed {
    #[must_use]
    pub fn from_u128(value: u128) -> Self {
        Self(value.to_be_bytes())
    }
}

impl fmt::Display for ResampleSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

/// Error returned when a seed string is not 32 hex digits.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid seed {input:?}: expected 32 hex digits")]
pub struct ParseSeedError {
    input: String,
}

impl FromStr for ResampleSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
        Ok(Self::from_u128(num))
    }
}

impl Serialize for ResampleSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ResampleSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows drawing a fresh seed with `rng.random()`.
impl Distribution<ResampleSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ResampleSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        ResampleSeed(seed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapOptions {
    /// Number of resamples.
    pub n_samples: usize,
    /// Two-sided significance level; the confidence is `1 - alpha`.
    pub alpha: f64,
    pub method: BootstrapMethod,
    pub output: CiOutput,
    /// Fixed seed, or `None` to draw one from the thread-local generator.
    pub seed: Option<ResampleSeed>,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            n_samples: 10_000,
            alpha: 0.05,
            method: BootstrapMethod::default(),
            output: CiOutput::default(),
            seed: None,
        }
    }
}

/// Estimates a confidence interval of `statistic` over `data` by resampling.
///
/// For [`CiOutput::ErrorBar`] the distances are measured from
/// `statistic(data)`.
pub fn bootstrap_ci<F>(
    data: &[f64],
    statistic: F,
    options: &BootstrapOptions,
) -> Result<ConfidenceInterval, StatsError>
where
    F: Fn(&[f64]) -> f64,
{
    ensure_non_empty("data", data)?;
    if options.n_samples == 0 {
        return Err(StatsError::NoResamples);
    }
    if !(options.alpha > 0.0 && options.alpha < 1.0) {
        return Err(StatsError::InvalidAlpha {
            alpha: options.alpha,
        });
    }

    let seed = options.seed.unwrap_or_else(|| rand::rng().random());
    tracing::debug!(
        n_samples = options.n_samples,
        alpha = options.alpha,
        method = %options.method,
        %seed,
        "bootstrap resampling"
    );

    let point = statistic(data);
    let resampled = resample_statistics(data, &statistic, options.n_samples, seed);
    let (low, high) = match options.method {
        BootstrapMethod::Percentile => percentile_bounds(&resampled, options.alpha),
        BootstrapMethod::Bca => bca_bounds(data, &statistic, point, &resampled, options.alpha),
    };

    Ok(match options.output {
        CiOutput::LowHigh => ConfidenceInterval::LowHigh { low, high },
        CiOutput::ErrorBar => ConfidenceInterval::ErrorBar {
            minus: (point - low).abs(),
            plus: (high - point).abs(),
        },
    })
}

/// Sorted statistics of `n_samples` resamples of `data`.
fn resample_statistics<F>(
    data: &[f64],
    statistic: &F,
    n_samples: usize,
    seed: ResampleSeed,
) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut rng = Pcg32::from_seed(seed.0);
    let mut sample = vec![0.0; data.len()];
    let mut stats = (0..n_samples)
        .map(|_| {
            for slot in &mut sample {
                *slot = data[rng.random_range(0..data.len())];
            }
            statistic(&sample)
        })
        .collect::<Vec<_>>();
    stats.sort_by(f64::total_cmp);
    stats
}

/// Position `level` (0 to 1) in the sorted statistics, truncated and clamped.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn at_level(sorted: &[f64], level: f64) -> f64 {
    let idx = (level * sorted.len() as f64) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn percentile_bounds(sorted: &[f64], alpha: f64) -> (f64, f64) {
    (
        at_level(sorted, alpha / 2.0),
        at_level(sorted, 1.0 - alpha / 2.0),
    )
}

#[expect(clippy::cast_precision_loss)]
fn bca_bounds<F>(
    data: &[f64],
    statistic: &F,
    point: f64,
    sorted: &[f64],
    alpha: f64,
) -> (f64, f64)
where
    F: Fn(&[f64]) -> f64,
{
    let first = sorted[0];
    let last = sorted[sorted.len() - 1];
    if first == last {
        return (first, last);
    }

    // Bias correction, keeping the fraction away from 0 and 1.
    let normal = Normal::standard();
    let n = sorted.len() as f64;
    let below = sorted.partition_point(|&s| s < point) as f64;
    let fraction = (below / n).clamp(0.5 / n, 1.0 - 0.5 / n);
    let z0 = normal.inverse_cdf(fraction);

    // Acceleration from leave-one-out estimates.
    let mut held_out = Vec::with_capacity(data.len().saturating_sub(1));
    let jackknife = (0..data.len())
        .map(|i| {
            held_out.clear();
            held_out.extend_from_slice(&data[..i]);
            held_out.extend_from_slice(&data[i + 1..]);
            statistic(&held_out)
        })
        .collect::<Vec<_>>();
    let jack_mean = mean(&jackknife);
    let (num, den) = jackknife.iter().fold((0.0, 0.0), |(num, den), &j| {
        let d = jack_mean - j;
        (num + d.powi(3), den + d.powi(2))
    });
    let acceleration = if den > 0.0 && data.len() > 1 {
        num / (6.0 * den.powf(1.5))
    } else {
        0.0
    };

    let adjusted = |level: f64| {
        let z = z0 + normal.inverse_cdf(level);
        normal.cdf(z0 + z / (1.0 - acceleration * z))
    };
    (
        at_level(sorted, adjusted(alpha / 2.0)),
        at_level(sorted, adjusted(1.0 - alpha / 2.0)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptive::Statistic;

    fn seeded(method: BootstrapMethod, output: CiOutput) -> BootstrapOptions {
        BootstrapOptions {
            n_samples: 2000,
            method,
            output,
            seed: Some(ResampleSeed::from_u128(42)),
            ..BootstrapOptions::default()
        }
    }

    fn sample_data() -> Vec<f64> {
        (1..=40).map(|i| f64::from(i * i % 17)).collect()
    }

    #[test]
    fn test_constant_data_gives_zero_width() {
        let data = [5.0; 12];
        for method in [BootstrapMethod::Percentile, BootstrapMethod::Bca] {
            let ci = bootstrap_ci(&data, mean, &seeded(method, CiOutput::LowHigh)).unwrap();
            assert_eq!(ci, ConfidenceInterval::LowHigh { low: 5.0, high: 5.0 });
            let ci = bootstrap_ci(&data, mean, &seeded(method, CiOutput::ErrorBar)).unwrap();
            assert_eq!(ci, ConfidenceInterval::ErrorBar { minus: 0.0, plus: 0.0 });
        }
    }

    #[test]
    fn test_interval_brackets_point_estimate() {
        let data = sample_data();
        let point = mean(&data);
        for method in [BootstrapMethod::Percentile, BootstrapMethod::Bca] {
            let ci = bootstrap_ci(&data, mean, &seeded(method, CiOutput::LowHigh)).unwrap();
            let ConfidenceInterval::LowHigh { low, high } = ci else {
                panic!("unexpected output {ci:?}");
            };
            assert!(low < point && point < high, "{method}: {low} {point} {high}");
        }
    }

    #[test]
    fn test_error_bar_matches_low_high() {
        let data = sample_data();
        let point = mean(&data);
        let ConfidenceInterval::LowHigh { low, high } = bootstrap_ci(
            &data,
            mean,
            &seeded(BootstrapMethod::Percentile, CiOutput::LowHigh),
        )
        .unwrap() else {
            panic!("expected low/high");
        };
        let ci = bootstrap_ci(
            &data,
            mean,
            &seeded(BootstrapMethod::Percentile, CiOutput::ErrorBar),
        )
        .unwrap();
        assert_eq!(
            ci,
            ConfidenceInterval::ErrorBar {
                minus: (point - low).abs(),
                plus: (high - point).abs(),
            }
        );
    }

    #[test]
    fn test_seed_is_reproducible() {
        let data = sample_data();
        let options = seeded(BootstrapMethod::Percentile, CiOutput::LowHigh);
        let median = |s: &[f64]| Statistic::Median.apply(s);
        assert_eq!(
            bootstrap_ci(&data, median, &options).unwrap(),
            bootstrap_ci(&data, median, &options).unwrap()
        );
    }

    #[test]
    fn test_wider_interval_for_smaller_alpha() {
        let data = sample_data();
        let width = |alpha| {
            let options = BootstrapOptions {
                alpha,
                ..seeded(BootstrapMethod::Percentile, CiOutput::LowHigh)
            };
            match bootstrap_ci(&data, mean, &options).unwrap() {
                ConfidenceInterval::LowHigh { low, high } => high - low,
                ConfidenceInterval::ErrorBar { .. } => unreachable!(),
            }
        };
        assert!(width(0.01) >= width(0.32));
    }

    #[test]
    fn test_invalid_options() {
        let options = BootstrapOptions::default();
        assert_eq!(
            bootstrap_ci(&[], mean, &options),
            Err(StatsError::EmptyInput { name: "data" })
        );
        let no_samples = BootstrapOptions {
            n_samples: 0,
            ..BootstrapOptions::default()
        };
        assert_eq!(
            bootstrap_ci(&[1.0], mean, &no_samples),
            Err(StatsError::NoResamples)
        );
        let bad_alpha = BootstrapOptions {
            alpha: 1.0,
            ..BootstrapOptions::default()
        };
        assert_eq!(
            bootstrap_ci(&[1.0], mean, &bad_alpha),
            Err(StatsError::InvalidAlpha { alpha: 1.0 })
        );
    }

    #[test]
    fn test_percentile_positions_are_clamped() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile_bounds(&sorted, 0.5), (2.0, 4.0));
        assert_eq!(at_level(&sorted, 1.0), 4.0);
    }

    #[test]
    fn test_seed_serde() {
        let seed = ResampleSeed::from_u128(0xabc);
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"00000000000000000000000000000abc\"");
        assert_eq!(serde_json::from_str::<ResampleSeed>(&json).unwrap(), seed);
        assert!(serde_json::from_str::<ResampleSeed>("\"abc\"").is_err());
    }

    #[test]
    fn test_seed_rejects_non_hex_characters() {
        let signed = format!("+{}", "f".repeat(31));
        assert_eq!(signed.len(), 32);
        assert!(signed.parse::<ResampleSeed>().is_err());
        assert!(format!("{}g", "0".repeat(31)).parse::<ResampleSeed>().is_err());
        assert_eq!(
            "F".repeat(32).parse::<ResampleSeed>().unwrap(),
            ResampleSeed::from_u128(u128::MAX)
        );
    }

    #[test]
    fn test_bca_is_centred_for_symmetric_data() {
        let data = (0..41).map(f64::from).collect::<Vec<_>>();
        let options = seeded(BootstrapMethod::Bca, CiOutput::ErrorBar);
        let ci = bootstrap_ci(&data, mean, &options).unwrap();
        let ConfidenceInterval::ErrorBar { minus, plus } = ci else {
            panic!("expected error bar");
        };
        assert!(minus > 0.0 && plus > 0.0);
        assert!((minus - plus).abs() < 0.25 * (minus + plus), "{minus} {plus}");
    }

    #[test]
    fn test_output_parse() {
        assert_eq!("errorbar".parse::<CiOutput>().unwrap(), CiOutput::ErrorBar);
        assert_eq!("lowhigh".parse::<CiOutput>().unwrap(), CiOutput::LowHigh);
        assert_eq!("BCa".parse::<BootstrapMethod>().unwrap(), BootstrapMethod::Bca);
        assert!("jackknife".parse::<BootstrapMethod>().is_err());
    }
}
