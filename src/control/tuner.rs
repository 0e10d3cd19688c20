//! Top-level run driver.

use std::time::{Duration, Instant};

use tracing::info;

use super::branching::{refine, LevelRecord};
use crate::anneal::AnnealingSearch;
use crate::config::{StrategyKind, TuneConfig};
use crate::error::TuneError;
use crate::hooks::{Checkpoint, Notifier};
use crate::local::CoordinateSearch;
use crate::oracle::Evaluate;
use crate::schedule::{Schedule, Target};
use crate::search::{ScheduleSearch, Session};

/// Result of a complete tuning run.
#[derive(Debug, Clone)]
pub struct TuneOutcome {
    /// Final schedule.
    pub best: Schedule,
    /// Cost of `best`.
    pub best_cost: f64,
    /// Deepest branching level reached (0 without branching).
    pub depth: usize,
    /// Per-level history; a single entry without branching.
    pub levels: Vec<LevelRecord>,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

/// Runs one configured tuning job.
///
/// # Examples
///
/// ```
/// use lut_tune::config::TuneConfig;
/// use lut_tune::control::Tuner;
/// use lut_tune::error::TuneError;
/// use lut_tune::hooks::{MemoryCheckpoint, SilentNotifier};
/// use lut_tune::oracle::{Evaluate, Fitness};
/// use lut_tune::schedule::{Schedule, Target, Variable};
/// use lut_tune::local::LocalConfig;
///
/// struct Bowl;
///
/// impl Evaluate for Bowl {
///     fn evaluate(&self, s: &Schedule) -> Result<Fitness, TuneError> {
///         s.validate()?;
///         Ok(Fitness::Solved(s.amplitude.iter().map(|a| (a - 0.51).powi(2)).sum()))
///     }
/// }
///
/// let config = TuneConfig::default()
///     .with_target(Target::Single(Variable::Amplitude))
///     .with_local(LocalConfig::default().with_seed(1));
/// let tuner = Tuner::new(config).unwrap();
///
/// let mut checkpoint = MemoryCheckpoint::new();
/// let outcome = tuner
///     .run(Schedule::uniform(2, 1.0, 0.5, 16), &Bowl, &mut checkpoint, &SilentNotifier)
///     .unwrap();
/// assert!(outcome.best_cost < 0.005);
/// ```
pub struct Tuner {
    config: TuneConfig,
}

impl Tuner {
    /// Creates a tuner, rejecting an invalid configuration.
    pub fn new(config: TuneConfig) -> Result<Self, TuneError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TuneConfig {
        &self.config
    }

    fn strategy(&self) -> Box<dyn ScheduleSearch> {
        match self.config.strategy {
            StrategyKind::Coordinate => Box::new(CoordinateSearch::new(
                self.config.local.clone(),
                self.config.mode,
            )),
            StrategyKind::Annealing => Box::new(self.annealing()),
        }
    }

    fn annealing(&self) -> AnnealingSearch {
        AnnealingSearch::new(self.config.anneal.clone().scaled_for_trials(self.config.trials))
    }

    /// Tunes `initial` against `oracle`.
    ///
    /// The schedule's lengths and value domains are checked before the first
    /// oracle call. Every new
    /// best goes to `checkpoint`; progress messages go to `notifier`.
    pub fn run(
        &self,
        initial: Schedule,
        oracle: &dyn Evaluate,
        checkpoint: &mut dyn Checkpoint,
        notifier: &dyn Notifier,
    ) -> Result<TuneOutcome, TuneError> {
        initial.validate()?;
        initial.check_domain()?;
        let start = Instant::now();
        let target = self.config.target;
        let mut session = Session::new(oracle, checkpoint, notifier);

        info!(
            selector = %target,
            mode = %self.config.mode,
            strategy = ?self.config.strategy,
            bins = initial.bins(),
            "Starting optimization"
        );
        session.notify(&format!(
            "Starting optimization of {target} in mode {} with {} bins",
            self.config.mode,
            initial.bins()
        ));

        let (best, best_cost, depth, levels) = match target {
            Target::Single(variable) => {
                let outcome = self.strategy().search(initial, variable, &mut session)?;
                let level = LevelRecord {
                    depth: 0,
                    bins: outcome.best.bins(),
                    cost: outcome.best_cost,
                    searched: true,
                    changed: outcome.improved(),
                };
                (outcome.best, outcome.best_cost, 0, vec![level])
            }
            Target::Alternating => {
                let mut search = self.strategy();
                let outcome = refine(
                    search.as_mut(),
                    initial,
                    self.config.recursion_limit,
                    self.config.max_alternation_rounds,
                    &mut session,
                )?;
                (outcome.best, outcome.best_cost, outcome.depth, outcome.levels)
            }
            Target::Joint => {
                let outcome = self.annealing().search_joint(initial, &mut session)?;
                let level = LevelRecord {
                    depth: 0,
                    bins: outcome.best.bins(),
                    cost: outcome.best_cost,
                    searched: true,
                    changed: outcome.improved(),
                };
                (outcome.best, outcome.best_cost, 0, vec![level])
            }
        };

        let elapsed = start.elapsed();
        info!("Best # updates: {best_cost}");
        info!(depth, bins = best.bins(), "Optimization finished in {:.1}s", elapsed.as_secs_f64());
        session.notify(&format!(
            "Optimization of {target} finished in {:.1}s. Best # updates: {best_cost}",
            elapsed.as_secs_f64()
        ));

        Ok(TuneOutcome {
            best,
            best_cost,
            depth,
            levels,
            elapsed,
        })
    }
}
