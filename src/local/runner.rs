//! Coordinate-wise search execution.
//!
//! # Algorithm
//!
//! 1. Evaluate the initial schedule; it is the first best
//! 2. For each pass (at most `max_passes`):
//!    a. Build the visiting order (sweep or shuffle, per experiment mode)
//!    b. For each index: derive its interval from the *current* schedule,
//!    minimize the cost over that one coordinate with Brent's method, and
//!    commit the minimizer into the working schedule
//!    c. Whenever the cost beats the best so far, record, checkpoint and
//!    announce the new best
//! 3. Stop early after a pass without improvement (stall)

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use super::brent::minimize_bounded;
use super::config::LocalConfig;
use crate::bounds::{BoundEstimator, BoundPair};
use crate::config::{DeltaTMove, ExperimentMode};
use crate::error::TuneError;
use crate::oracle::Evaluate;
use crate::schedule::{Schedule, Variable, MIN_PSIZE};
use crate::search::{OptimizationState, ScheduleSearch, SearchOutcome, Session};

/// Bounded per-coordinate search over one schedule vector.
pub struct CoordinateSearch {
    config: LocalConfig,
    mode: ExperimentMode,
    estimator: BoundEstimator,
    rng: StdRng,
}

impl CoordinateSearch {
    pub fn new(config: LocalConfig, mode: ExperimentMode) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            estimator: BoundEstimator::new(config.bounds),
            config,
            mode,
            rng,
        }
    }

    pub fn config(&self) -> &LocalConfig {
        &self.config
    }

    /// Visiting order for one pass over `bins` coordinates.
    ///
    /// Sweep mode yields `0, 1, .., n-1, n-2, .., 0`; shuffled modes visit
    /// every index twice in random order.
    pub fn pass_order(&mut self, bins: usize) -> Vec<usize> {
        if self.mode.is_shuffled() {
            let mut order: Vec<usize> = (0..bins).chain(0..bins).collect();
            order.shuffle(&mut self.rng);
            order
        } else {
            (0..bins).chain((0..bins.saturating_sub(1)).rev()).collect()
        }
    }

    /// Search interval of one coordinate, or `None` if it is not searched
    /// (the last `dT` when edges are shifted).
    pub fn interval(&self, schedule: &Schedule, variable: Variable, index: usize) -> Option<BoundPair> {
        match variable {
            Variable::Amplitude => Some(self.estimator.bounds(&schedule.amplitude, index)),
            Variable::DeltaT => match self.mode.delta_t_move() {
                DeltaTMove::EdgeShift => {
                    if index + 1 >= schedule.bins() {
                        return None;
                    }
                    let edges = schedule.edges();
                    Some(BoundPair {
                        lower: edges[index],
                        upper: edges[index + 2],
                    })
                }
                DeltaTMove::Free => {
                    let (lower, upper) = self.config.dt_range;
                    Some(BoundPair { lower, upper })
                }
            },
            Variable::PopulationSize => {
                let p = schedule.psize[index] as f64;
                let floor = MIN_PSIZE as f64;
                let (low, high) = self.config.psize_scale;
                Some(BoundPair {
                    lower: (low * p).max(floor),
                    upper: (high * p).max(floor),
                })
            }
        }
    }

    /// `schedule` with coordinate `index` of `variable` set to `x`.
    fn candidate(&self, schedule: &Schedule, variable: Variable, index: usize, x: f64) -> Schedule {
        if variable == Variable::DeltaT && self.mode.delta_t_move() == DeltaTMove::EdgeShift {
            schedule.with_shifted_edge(index, x)
        } else {
            schedule.with_value(variable, index, x)
        }
    }

    /// Runs one pass over `order`, mutating `state.current` coordinate by
    /// coordinate. Returns whether the best cost improved during the pass.
    pub fn optimize_pass(
        &self,
        state: &mut OptimizationState,
        variable: Variable,
        order: &[usize],
        session: &mut Session<'_>,
    ) -> Result<bool, TuneError> {
        let oracle = session.oracle;
        let mut improved = false;

        for &index in order {
            let Some(interval) = self.interval(&state.current, variable, index) else {
                continue;
            };

            let base = &state.current;
            let minimum = minimize_bounded(
                |x| oracle.cost(&self.candidate(base, variable, index, x)),
                interval.lower,
                interval.upper,
                self.config.tolerance,
                self.config.max_evaluations,
            )?;

            state.current = self.candidate(&state.current, variable, index, minimum.x);

            if state.offer(minimum.fx) {
                session.improved(&state.best, variable.label(), state.best_cost)?;
                improved = true;
            }

            debug!(
                "Found {}[{}]={} at updates {} after {} tries",
                variable, index, minimum.x, minimum.fx, minimum.evaluations
            );
        }

        Ok(improved)
    }
}

impl ScheduleSearch for CoordinateSearch {
    fn name(&self) -> &str {
        "coordinate"
    }

    fn search(
        &mut self,
        initial: Schedule,
        variable: Variable,
        session: &mut Session<'_>,
    ) -> Result<SearchOutcome, TuneError> {
        let initial_cost = session.oracle.cost(&initial)?;
        let mut state = OptimizationState::new(initial, initial_cost, session.depth);
        let max_passes = self.config.max_passes;
        let mut passes = 0;

        for pass in 0..max_passes {
            let order = self.pass_order(state.current.bins());
            let improved = self.optimize_pass(&mut state, variable, &order, session)?;
            passes += 1;

            session.notify(&format!(
                "Progress: {}/{} iterations complete.\nLevel: {}",
                pass + 1,
                max_passes,
                state.depth
            ));

            if !improved {
                state.stalled = true;
                let message = format!(
                    "Optimization converged at {}, with {}={:?}",
                    state.best_cost,
                    variable,
                    state.best.values(variable)
                );
                info!("No changes detected after pass {}. {message}", pass + 1);
                session.notify(&message);
                break;
            }
        }

        Ok(SearchOutcome {
            best: state.best,
            best_cost: state.best_cost,
            initial_cost,
            iterations: passes,
            stalled: state.stalled,
        })
    }
}
