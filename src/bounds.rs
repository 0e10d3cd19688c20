//! Neighbor-aware search intervals for amplitude coordinates.
//!
//! A coordinate may only move by an amount proportional to how far it
//! already sits from its neighbors, capped at an absolute step. On an
//! interior coordinate the wider allowance points in the direction the
//! curve is trending (upward when `v[i-1] <= v[i+1]`), so a smooth curve
//! is not pushed into a zig-zag.
//!
//! Intervals are always derived from the vector as it is *now*; they are
//! never cached, since neighbors move between calls.

use crate::error::TuneError;

/// Parameters of the [`BoundEstimator`].
///
/// # Examples
///
/// ```
/// use lut_tune::bounds::BoundConfig;
///
/// let config = BoundConfig::default().with_cap(0.2).with_multiplier(1.5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundConfig {
    /// Factor applied to each neighbor gap.
    pub multiplier: f64,
    /// Absolute cap on either allowance.
    pub cap: f64,
    /// Floor on either allowance, so a flat curve can still move.
    pub min_allowance: f64,
}

impl Default for BoundConfig {
    fn default() -> Self {
        Self {
            multiplier: 1.1,
            cap: 0.1,
            min_allowance: 0.02,
        }
    }
}

impl BoundConfig {
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_cap(mut self, cap: f64) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_min_allowance(mut self, min_allowance: f64) -> Self {
        self.min_allowance = min_allowance;
        self
    }

    pub fn validate(&self) -> Result<(), TuneError> {
        if self.multiplier <= 0.0 {
            return Err(TuneError::InvalidConfig(
                "bound multiplier must be positive".into(),
            ));
        }
        if self.cap <= 0.0 {
            return Err(TuneError::InvalidConfig("bound cap must be positive".into()));
        }
        if self.min_allowance < 0.0 || self.min_allowance > self.cap {
            return Err(TuneError::InvalidConfig(format!(
                "min_allowance must be in [0, cap], got {}",
                self.min_allowance
            )));
        }
        Ok(())
    }
}

/// Search interval for one coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundPair {
    pub lower: f64,
    pub upper: f64,
}

impl BoundPair {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, x: f64) -> bool {
        self.lower <= x && x <= self.upper
    }
}

/// Computes per-coordinate intervals for vectors valued in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundEstimator {
    config: BoundConfig,
}

impl BoundEstimator {
    pub fn new(config: BoundConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BoundConfig {
        &self.config
    }

    fn allowance(&self, a: f64, b: f64) -> f64 {
        (self.config.multiplier * (a - b).abs())
            .max(self.config.min_allowance)
            .min(self.config.cap)
    }

    /// How far coordinate `index` may move `(down, up)`, before clamping.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn allowances(&self, v: &[f64], index: usize) -> (f64, f64) {
        let n = v.len();
        assert!(index < n, "index {index} out of range for {n} bins");

        if n == 1 {
            let d = self.config.min_allowance;
            return (d, d);
        }
        if index == 0 {
            let d = self.allowance(v[1], v[0]);
            return (d, d);
        }
        if index == n - 1 {
            let d = self.allowance(v[index], v[index - 1]);
            return (d, d);
        }

        let left = self.allowance(v[index], v[index - 1]);
        let right = self.allowance(v[index + 1], v[index]);
        let (narrow, wide) = if left <= right {
            (left, right)
        } else {
            (right, left)
        };

        if v[index - 1] <= v[index + 1] {
            (narrow, wide)
        } else {
            (wide, narrow)
        }
    }

    /// Interval for coordinate `index`, clamped to `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn bounds(&self, v: &[f64], index: usize) -> BoundPair {
        let (down, up) = self.allowances(v, index);
        let upper = (v[index] + up).min(1.0);
        let lower = (v[index] - down).max(0.0).min(upper);
        BoundPair { lower, upper }
    }
}
