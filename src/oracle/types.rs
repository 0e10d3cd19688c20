//! Fitness results and the solver seam.

use crate::error::TuneError;
use crate::schedule::Schedule;

/// Cost charged for a solver run that failed outright (timeout), in updates.
///
/// Also the per-unit surcharge for runs in which no trial reached a
/// solution, so it must dominate every real update count.
pub const PENALTY: f64 = 10_000_000.0;

/// The trial set a schedule is evaluated against.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrialSpec {
    /// File listing the problem instances to run.
    pub trial_list: String,
    /// Number of solver runs per instance.
    pub trials: u32,
    /// Run tag; names the solver's scratch and result files.
    pub tag: String,
    /// Optional `(step weight, runtime)` pair forwarded to the solver.
    pub weight_runtime: Option<(String, String)>,
}

impl TrialSpec {
    pub fn new(trial_list: impl Into<String>, trials: u32, tag: impl Into<String>) -> Self {
        Self {
            trial_list: trial_list.into(),
            trials,
            tag: tag.into(),
            weight_runtime: None,
        }
    }

    pub fn with_weight_runtime(mut self, weight: impl Into<String>, runtime: impl Into<String>) -> Self {
        self.weight_runtime = Some((weight.into(), runtime.into()));
        self
    }
}

/// What the solver reports after a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverReport {
    /// Number of trials that reached a solution.
    pub hits: u32,
    /// Updates spent, as reported by the solver.
    pub total_updates: f64,
    /// Multiplier applied to [`PENALTY`] when no trial succeeded.
    pub scale_factor: f64,
}

/// Outcome of one solver invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverOutcome {
    Completed(SolverReport),
    TimedOut,
}

/// The external solver: runs a schedule over a trial set.
pub trait Solver {
    fn run(&self, schedule: &Schedule, trial: &TrialSpec) -> Result<SolverOutcome, TuneError>;
}

impl<F> Solver for F
where
    F: Fn(&Schedule, &TrialSpec) -> Result<SolverOutcome, TuneError>,
{
    fn run(&self, schedule: &Schedule, trial: &TrialSpec) -> Result<SolverOutcome, TuneError> {
        self(schedule, trial)
    }
}

/// Tagged fitness of one schedule. Lower cost is better.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Fitness {
    /// At least one trial solved; cost is the reported update count.
    Solved(f64),
    /// No trial solved.
    Unsolved { updates: f64, scale: f64 },
    /// The solver did not finish in time.
    TimedOut,
}

impl Fitness {
    /// Classifies a completed run.
    pub fn from_report(report: &SolverReport) -> Self {
        if report.hits < 1 {
            Fitness::Unsolved {
                updates: report.total_updates,
                scale: report.scale_factor,
            }
        } else {
            Fitness::Solved(report.total_updates)
        }
    }

    /// Scalar cost used for comparisons.
    pub fn cost(&self) -> f64 {
        match *self {
            Fitness::Solved(cost) => cost,
            Fitness::Unsolved { updates, scale } => updates + scale * PENALTY,
            Fitness::TimedOut => PENALTY,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, Fitness::Solved(_))
    }
}

/// Anything that can score a schedule. Every optimizer talks to this.
pub trait Evaluate {
    /// Scores a schedule. Fails only when the schedule is malformed or the
    /// solver could not be run at all.
    fn evaluate(&self, schedule: &Schedule) -> Result<Fitness, TuneError>;

    /// Shorthand for `evaluate(..).cost()`.
    fn cost(&self, schedule: &Schedule) -> Result<f64, TuneError> {
        Ok(self.evaluate(schedule)?.cost())
    }
}

impl<E: Evaluate + ?Sized> Evaluate for &E {
    fn evaluate(&self, schedule: &Schedule) -> Result<Fitness, TuneError> {
        (**self).evaluate(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsolved_dominates_solved() {
        let solved = Fitness::from_report(&SolverReport {
            hits: 3,
            total_updates: 9_000_000.0,
            scale_factor: 1.0,
        });
        let unsolved = Fitness::from_report(&SolverReport {
            hits: 0,
            total_updates: 10.0,
            scale_factor: 1.0,
        });

        assert!(solved.is_solved());
        assert!(matches!(unsolved, Fitness::Unsolved { .. }));
        assert!(unsolved.cost() > solved.cost());
        assert!((unsolved.cost() - (10.0 + PENALTY)).abs() < 1e-6);
    }

    #[test]
    fn test_timeout_costs_penalty() {
        assert_eq!(Fitness::TimedOut.cost(), PENALTY);
        assert!(!Fitness::TimedOut.is_solved());
    }
}
