//! Coordinate search configuration.

use crate::bounds::BoundConfig;
use crate::error::TuneError;

/// Configuration for [`CoordinateSearch`](super::CoordinateSearch).
///
/// # Examples
///
/// ```
/// use lut_tune::local::LocalConfig;
///
/// let config = LocalConfig::default()
///     .with_max_passes(3)
///     .with_tolerance(0.005)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalConfig {
    /// Maximum number of passes over the coordinates.
    pub max_passes: usize,

    /// Absolute tolerance of the scalar minimizer.
    pub tolerance: f64,

    /// Evaluation budget of one scalar minimization.
    pub max_evaluations: usize,

    /// Bound estimator parameters for amplitudes.
    pub bounds: BoundConfig,

    /// Search range of a single `dT` value when edges are not shifted.
    pub dt_range: (f64, f64),

    /// Population sizes are searched in `[low * p, high * p]`.
    pub psize_scale: (f64, f64),

    /// Random seed for shuffled coordinate orders.
    pub seed: Option<u64>,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            max_passes: 5,
            tolerance: 0.01,
            max_evaluations: 500,
            bounds: BoundConfig::default(),
            dt_range: (0.1, 2.0),
            psize_scale: (0.5, 2.0),
            seed: None,
        }
    }
}

impl LocalConfig {
    pub fn with_max_passes(mut self, n: usize) -> Self {
        self.max_passes = n;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = n;
        self
    }

    pub fn with_bounds(mut self, bounds: BoundConfig) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_dt_range(mut self, low: f64, high: f64) -> Self {
        self.dt_range = (low, high);
        self
    }

    pub fn with_psize_scale(mut self, low: f64, high: f64) -> Self {
        self.psize_scale = (low, high);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TuneError> {
        if self.max_passes == 0 {
            return Err(TuneError::InvalidConfig("max_passes must be at least 1".into()));
        }
        if self.tolerance <= 0.0 {
            return Err(TuneError::InvalidConfig("tolerance must be positive".into()));
        }
        if self.max_evaluations == 0 {
            return Err(TuneError::InvalidConfig(
                "max_evaluations must be at least 1".into(),
            ));
        }
        let (low, high) = self.dt_range;
        if low <= 0.0 || high <= low {
            return Err(TuneError::InvalidConfig(format!(
                "dt_range must satisfy 0 < low < high, got ({low}, {high})"
            )));
        }
        let (low, high) = self.psize_scale;
        if low <= 0.0 || high < low {
            return Err(TuneError::InvalidConfig(format!(
                "psize_scale must satisfy 0 < low <= high, got ({low}, {high})"
            )));
        }
        self.bounds.validate()
    }
}
