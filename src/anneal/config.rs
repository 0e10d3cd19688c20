//! Annealing configuration and cooling schedule.

use crate::error::TuneError;

/// Configuration for [`AnnealRunner`](super::AnnealRunner).
///
/// Temperatures and the step budget are given for a single solver trial;
/// [`scaled_for_trials`](Self::scaled_for_trials) divides them by the trial
/// count of the run, since the oracle cost grows with it.
///
/// # Examples
///
/// ```
/// use lut_tune::anneal::AnnealConfig;
///
/// let config = AnnealConfig::default().with_seed(42).scaled_for_trials(20);
/// assert_eq!(config.steps, 500);
/// assert!((config.max_temperature - 250_000.0).abs() < 1e-9);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealConfig {
    /// Temperature of the first step.
    pub max_temperature: f64,

    /// Temperature of the last step.
    pub min_temperature: f64,

    /// Number of perturbations (one oracle call each).
    pub steps: usize,

    /// Sampling range of a time delta.
    pub dt_range: (f64, f64),

    /// Sampling range of an amplitude.
    pub amplitude_range: (f64, f64),

    /// Population sizes are resampled within `±psize_window` of the current
    /// value, floored at [`MIN_PSIZE`](crate::schedule::MIN_PSIZE).
    pub psize_window: u32,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            max_temperature: 5.0e6,
            min_temperature: 1.0e5,
            steps: 10_000,
            dt_range: (0.1, 100.0),
            amplitude_range: (0.1, 1.0),
            psize_window: 4,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_max_temperature(mut self, t: f64) -> Self {
        self.max_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_steps(mut self, n: usize) -> Self {
        self.steps = n;
        self
    }

    pub fn with_dt_range(mut self, low: f64, high: f64) -> Self {
        self.dt_range = (low, high);
        self
    }

    pub fn with_amplitude_range(mut self, low: f64, high: f64) -> Self {
        self.amplitude_range = (low, high);
        self
    }

    pub fn with_psize_window(mut self, window: u32) -> Self {
        self.psize_window = window;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Divides both temperatures and the step budget by `trials`.
    ///
    /// The step budget never drops below one. `trials == 0` is treated as 1.
    pub fn scaled_for_trials(mut self, trials: u32) -> Self {
        let trials = trials.max(1);
        self.max_temperature /= f64::from(trials);
        self.min_temperature /= f64::from(trials);
        self.steps = (self.steps / trials as usize).max(1);
        self
    }

    /// Temperature at `step`: geometric from `max_temperature` down to
    /// `min_temperature` over `steps`.
    pub fn temperature(&self, step: usize) -> f64 {
        if self.steps <= 1 {
            return self.max_temperature;
        }
        let fraction = step.min(self.steps - 1) as f64 / (self.steps - 1) as f64;
        self.max_temperature * (self.min_temperature / self.max_temperature).powf(fraction)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TuneError> {
        if self.min_temperature <= 0.0 {
            return Err(TuneError::InvalidConfig("min_temperature must be positive".into()));
        }
        if self.max_temperature < self.min_temperature {
            return Err(TuneError::InvalidConfig(
                "max_temperature must not be less than min_temperature".into(),
            ));
        }
        if self.steps == 0 {
            return Err(TuneError::InvalidConfig("steps must be at least 1".into()));
        }
        for (name, (low, high)) in [
            ("dt_range", self.dt_range),
            ("amplitude_range", self.amplitude_range),
        ] {
            if low <= 0.0 || high < low {
                return Err(TuneError::InvalidConfig(format!(
                    "{name} must satisfy 0 < low <= high, got ({low}, {high})"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnnealConfig::default();
        assert_eq!(config.steps, 10_000);
        assert_eq!(config.psize_window, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scaled_for_trials() {
        let config = AnnealConfig::default().scaled_for_trials(100);
        assert!((config.max_temperature - 50_000.0).abs() < 1e-9);
        assert!((config.min_temperature - 1_000.0).abs() < 1e-9);
        assert_eq!(config.steps, 100);

        let tiny = AnnealConfig::default().scaled_for_trials(50_000);
        assert_eq!(tiny.steps, 1);
        assert!(tiny.validate().is_ok());
    }

    #[test]
    fn test_geometric_temperature() {
        let config = AnnealConfig::default()
            .with_max_temperature(100.0)
            .with_min_temperature(1.0)
            .with_steps(3);
        assert!((config.temperature(0) - 100.0).abs() < 1e-9);
        assert!((config.temperature(1) - 10.0).abs() < 1e-9);
        assert!((config.temperature(2) - 1.0).abs() < 1e-9);
        assert!((config.temperature(7) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(AnnealConfig::default().with_steps(0).validate().is_err());
        assert!(AnnealConfig::default()
            .with_min_temperature(0.0)
            .validate()
            .is_err());
        assert!(AnnealConfig::default()
            .with_max_temperature(10.0)
            .validate()
            .is_err());
        assert!(AnnealConfig::default()
            .with_amplitude_range(0.8, 0.2)
            .validate()
            .is_err());
    }
}
