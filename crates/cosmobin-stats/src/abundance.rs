//! Abundance matching by cumulative number density
//!
//! Each value of a source population gets the cumulative number density of
//! its rank. A reference relation between density and some other property is
//! then interpolated at that density, assigning the property to the source
//! values rank by rank.
//!
//! # Examples
//!
//! ```
//! use cosmobin_stats::abundance::{MatchOptions, Reference, abundance_match};
//!
//! let reference = Reference {
//!     values: vec![10.0, 20.0, 30.0],
//!     densities: vec![1.0, 2.0, 3.0],
//! };
//! let matched = abundance_match(&[0.7, 0.2, 0.5], &reference, &MatchOptions::default()).unwrap();
//! assert_eq!(matched, vec![30.0, 10.0, 20.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{StatsError, ensure_non_empty, ensure_same_length};

/// Which neighbours are counted when ranking a value.
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
pub enum Direction {
    /// Rank = 1 + number of values strictly below. The smallest value ranks first.
    #[default]
    #[display("below")]
    Below,
    /// Rank = 1 + number of values strictly above. The largest value ranks first.
    #[display("above")]
    Above,
}

/// Tabulated relation between cumulative density and a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub values: Vec<f64>,
    pub densities: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Volume the source population was drawn from.
    pub volume: f64,
    pub direction: Direction,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            volume: 1.0,
            direction: Direction::default(),
        }
    }
}

/// Cumulative rank of every value, in input order.
///
/// Tied values share the same rank.
///
/// ```
/// # use cosmobin_stats::abundance::{Direction, cumulative_counts};
/// assert_eq!(cumulative_counts(&[3.0, 1.0, 1.0], Direction::Below), vec![3, 1, 1]);
/// assert_eq!(cumulative_counts(&[3.0, 1.0, 1.0], Direction::Above), vec![1, 2, 2]);
/// ```
#[must_use]
pub fn cumulative_counts(values: &[f64], direction: Direction) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    values
        .iter()
        .map(|&v| {
            let strictly = match direction {
                Direction::Below => sorted.partition_point(|&s| s < v),
                Direction::Above => sorted.len() - sorted.partition_point(|&s| s <= v),
            };
            strictly + 1
        })
        .collect()
}

/// Cumulative rank of every value divided by `volume`.
#[expect(clippy::cast_precision_loss)]
pub fn cumulative_density(
    values: &[f64],
    volume: f64,
    direction: Direction,
) -> Result<Vec<f64>, StatsError> {
    ensure_non_empty("values", values)?;
    if !volume.is_finite() || volume <= 0.0 {
        return Err(StatsError::InvalidVolume { volume });
    }
    Ok(cumulative_counts(values, direction)
        .into_iter()
        .map(|count| count as f64 / volume)
        .collect())
}

/// Assigns reference values to `source` by matching cumulative densities.
pub fn abundance_match(
    source: &[f64],
    reference: &Reference,
    options: &MatchOptions,
) -> Result<Vec<f64>, StatsError> {
    ensure_non_empty("source", source)?;
    let densities = cumulative_density(source, options.volume, options.direction)?;
    abundance_match_densities(&densities, reference)
}

/// Assigns reference values to already known densities.
///
/// Densities outside the tabulated reference range are an error.
pub fn abundance_match_densities(
    densities: &[f64],
    reference: &Reference,
) -> Result<Vec<f64>, StatsError> {
    ensure_non_empty("densities", densities)?;
    let table = DensityTable::new(reference)?;
    densities.iter().map(|&d| table.interpolate(d)).collect()
}

/// Reference points sorted by density.
#[derive(Debug)]
struct DensityTable {
    points: Vec<(f64, f64)>,
}

impl DensityTable {
    fn new(reference: &Reference) -> Result<Self, StatsError> {
        ensure_non_empty("reference densities", &reference.densities)?;
        ensure_same_length(
            ("reference densities", &reference.densities),
            ("reference values", &reference.values),
        )?;
        let mut points = reference
            .densities
            .iter()
            .copied()
            .zip(reference.values.iter().copied())
            .collect::<Vec<_>>();
        if points.iter().any(|(d, _)| !d.is_finite()) {
            return Err(StatsError::NonFiniteInput {
                name: "reference densities",
            });
        }
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        if points[0].0 == points[points.len() - 1].0 {
            return Err(StatsError::DegenerateReference);
        }
        Ok(Self { points })
    }

    fn interpolate(&self, density: f64) -> Result<f64, StatsError> {
        let min = self.points[0].0;
        let max = self.points[self.points.len() - 1].0;
        if !(min..=max).contains(&density) {
            return Err(StatsError::DensityOutOfRange { density, min, max });
        }
        let idx = self.points.partition_point(|&(d, _)| d < density);
        if idx == 0 {
            return Ok(self.points[0].1);
        }
        let (d0, v0) = self.points[idx - 1];
        let (d1, v1) = self.points[idx];
        Ok(v0 + (v1 - v0) * (density - d0) / (d1 - d0))
    }
}
