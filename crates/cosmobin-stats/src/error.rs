/// Errors returned by the statistics routines.
///
/// Input-shape and option violations fail immediately. Bins that do not reach
/// the population threshold are not errors; they are simply left out of the
/// result.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum StatsError {
    #[display("{name} must contain at least one value")]
    EmptyInput { name: &'static str },
    #[display("{x_name} and {y_name} must have the same length ({x_len} != {y_len})")]
    LengthMismatch {
        x_name: &'static str,
        y_name: &'static str,
        x_len: usize,
        y_len: usize,
    },
    #[display("{name} contains a non-finite value")]
    NonFiniteInput { name: &'static str },
    #[display("bin width must be finite and positive, got {base}")]
    InvalidBinWidth { base: f64 },
    #[display("range needs {bins} bins, more than the limit of {limit}")]
    TooManyBins { bins: f64, limit: usize },
    #[display("bin width {base} is too small to separate edges near {value}")]
    UnresolvableBinWidth { base: f64, value: f64 },
    #[display("lower bound {min} exceeds upper bound {max}")]
    InvalidBounds { min: f64, max: f64 },
    #[display("percentile width list must not be empty")]
    EmptyWidths,
    #[display("percentile width must lie in (0, 100], got {width}")]
    InvalidWidth { width: f64 },
    #[display("number of bootstrap resamples must be positive")]
    NoResamples,
    #[display("alpha must lie in (0, 1), got {alpha}")]
    InvalidAlpha { alpha: f64 },
    #[display("volume must be finite and positive, got {volume}")]
    InvalidVolume { volume: f64 },
    #[display("reference needs at least two distinct densities")]
    DegenerateReference,
    #[display("density {density} lies outside the reference range [{min}, {max}]")]
    DensityOutOfRange { density: f64, min: f64, max: f64 },
}

pub(crate) fn ensure_non_empty(name: &'static str, values: &[f64]) -> Result<(), StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptyInput { name });
    }
    Ok(())
}

pub(crate) fn ensure_same_length(
    (x_name, x): (&'static str, &[f64]),
    (y_name, y): (&'static str, &[f64]),
) -> Result<(), StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            x_name,
            y_name,
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    Ok(())
}
