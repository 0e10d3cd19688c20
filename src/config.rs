//! Run configuration: what to tune and how.

use std::fmt;
use std::str::FromStr;

use crate::anneal::AnnealConfig;
use crate::error::TuneError;
use crate::local::LocalConfig;
use crate::schedule::Target;

/// Coordinate ordering and `dT` move style.
///
/// | mode | order                        | `dT` move   |
/// |------|------------------------------|-------------|
/// | 0    | ascending then descending    | free range  |
/// | 1    | every index twice, shuffled  | edge shift  |
/// | 2    | every index twice, shuffled  | free range  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExperimentMode {
    #[default]
    Sweep,
    Shuffle,
    ShuffleUnconstrained,
}

impl ExperimentMode {
    /// Whether coordinates are visited in random order.
    pub fn is_shuffled(&self) -> bool {
        !matches!(self, ExperimentMode::Sweep)
    }

    /// How `dT` coordinates are searched in this mode.
    pub fn delta_t_move(&self) -> DeltaTMove {
        match self {
            ExperimentMode::Shuffle => DeltaTMove::EdgeShift,
            _ => DeltaTMove::Free,
        }
    }
}

impl fmt::Display for ExperimentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            ExperimentMode::Sweep => 0,
            ExperimentMode::Shuffle => 1,
            ExperimentMode::ShuffleUnconstrained => 2,
        };
        write!(f, "{code}")
    }
}

impl FromStr for ExperimentMode {
    type Err = TuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(ExperimentMode::Sweep),
            "1" => Ok(ExperimentMode::Shuffle),
            "2" => Ok(ExperimentMode::ShuffleUnconstrained),
            other => Err(TuneError::InvalidConfig(format!(
                "experiment mode must be 0, 1 or 2, got {other:?}"
            ))),
        }
    }
}

/// How a single `dT` coordinate is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaTMove {
    /// Move the boundary between bin `i` and `i + 1` between its
    /// neighbouring boundaries; total time is preserved.
    EdgeShift,
    /// Search `dT[i]` alone over a fixed range.
    Free,
}

/// Which optimizer tunes each vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrategyKind {
    /// Bounded per-coordinate search.
    #[default]
    Coordinate,
    /// Simulated annealing.
    Annealing,
}

/// Top-level configuration of a tuning run.
///
/// # Examples
///
/// ```
/// use lut_tune::config::{ExperimentMode, StrategyKind, TuneConfig};
/// use lut_tune::schedule::Target;
///
/// let config = TuneConfig::default()
///     .with_target(Target::Alternating)
///     .with_mode(ExperimentMode::Shuffle)
///     .with_strategy(StrategyKind::Coordinate)
///     .with_trials(20);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TuneConfig {
    /// What to tune.
    pub target: Target,

    /// Coordinate order and `dT` move style.
    pub mode: ExperimentMode,

    /// Optimizer used for each vector.
    pub strategy: StrategyKind,

    /// Solver trials per evaluation; scales the annealing budget.
    pub trials: u32,

    /// Coordinate search parameters.
    pub local: LocalConfig,

    /// Annealing parameters, per single trial.
    pub anneal: AnnealConfig,

    /// Maximum branching depth.
    pub recursion_limit: usize,

    /// Upper bound on A/dT rounds at one branching level.
    pub max_alternation_rounds: usize,
}

impl Default for TuneConfig {
    fn default() -> Self {
        Self {
            target: Target::Alternating,
            mode: ExperimentMode::default(),
            strategy: StrategyKind::default(),
            trials: 1,
            local: LocalConfig::default(),
            anneal: AnnealConfig::default(),
            recursion_limit: 5,
            max_alternation_rounds: 100,
        }
    }
}

impl TuneConfig {
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn with_mode(mut self, mode: ExperimentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_trials(mut self, trials: u32) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_local(mut self, local: LocalConfig) -> Self {
        self.local = local;
        self
    }

    pub fn with_anneal(mut self, anneal: AnnealConfig) -> Self {
        self.anneal = anneal;
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn with_max_alternation_rounds(mut self, rounds: usize) -> Self {
        self.max_alternation_rounds = rounds;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TuneError> {
        if self.trials == 0 {
            return Err(TuneError::InvalidConfig("trials must be at least 1".into()));
        }
        if self.max_alternation_rounds == 0 {
            return Err(TuneError::InvalidConfig(
                "max_alternation_rounds must be at least 1".into(),
            ));
        }
        if self.target == Target::Joint && self.strategy != StrategyKind::Annealing {
            return Err(TuneError::InvalidConfig(
                "joint tuning of all three vectors requires the annealing strategy".into(),
            ));
        }
        self.local.validate()?;
        self.anneal.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TuneConfig::default();
        assert_eq!(config.recursion_limit, 5);
        assert_eq!(config.mode, ExperimentMode::Sweep);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("0".parse::<ExperimentMode>().unwrap(), ExperimentMode::Sweep);
        assert_eq!("1".parse::<ExperimentMode>().unwrap(), ExperimentMode::Shuffle);
        assert_eq!(
            "2".parse::<ExperimentMode>().unwrap(),
            ExperimentMode::ShuffleUnconstrained
        );
        assert!("3".parse::<ExperimentMode>().is_err());
        assert_eq!(ExperimentMode::Shuffle.to_string(), "1");
    }

    #[test]
    fn test_mode_selects_delta_t_move() {
        assert_eq!(ExperimentMode::Sweep.delta_t_move(), DeltaTMove::Free);
        assert_eq!(ExperimentMode::Shuffle.delta_t_move(), DeltaTMove::EdgeShift);
        assert_eq!(
            ExperimentMode::ShuffleUnconstrained.delta_t_move(),
            DeltaTMove::Free
        );
        assert!(!ExperimentMode::Sweep.is_shuffled());
        assert!(ExperimentMode::ShuffleUnconstrained.is_shuffled());
    }

    #[test]
    fn test_joint_requires_annealing() {
        let config = TuneConfig::default().with_target(Target::Joint);
        assert!(config.validate().is_err());
        assert!(config
            .with_strategy(StrategyKind::Annealing)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_zero_trials_rejected() {
        assert!(TuneConfig::default().with_trials(0).validate().is_err());
    }
}
