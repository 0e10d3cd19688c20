//! Annealing over schedules.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::config::AnnealConfig;
use super::runner::AnnealRunner;
use super::types::AnnealProblem;
use crate::error::TuneError;
use crate::oracle::Evaluate;
use crate::schedule::{Schedule, Target, Variable, MIN_PSIZE};
use crate::search::{ScheduleSearch, SearchOutcome, Session};

/// Which coordinates one perturbation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnealScope {
    /// One coordinate of one vector.
    Single(Variable),
    /// `dT`, `A` and `psize` of one bin together.
    Joint,
}

/// A schedule as an annealing state, scored by the fitness oracle.
pub struct ScheduleAnnealing<'a> {
    oracle: &'a dyn Evaluate,
    scope: AnnealScope,
    config: &'a AnnealConfig,
}

impl<'a> ScheduleAnnealing<'a> {
    pub fn new(oracle: &'a dyn Evaluate, scope: AnnealScope, config: &'a AnnealConfig) -> Self {
        Self {
            oracle,
            scope,
            config,
        }
    }

    fn resample<R: Rng>(
        &self,
        schedule: &mut Schedule,
        variable: Variable,
        index: usize,
        rng: &mut R,
    ) {
        match variable {
            Variable::DeltaT => {
                let (low, high) = self.config.dt_range;
                schedule.dt[index] = rng.random_range(low..=high);
            }
            Variable::Amplitude => {
                let (low, high) = self.config.amplitude_range;
                schedule.amplitude[index] = rng.random_range(low..=high);
            }
            Variable::PopulationSize => {
                let p = schedule.psize[index];
                let low = p.saturating_sub(self.config.psize_window).max(MIN_PSIZE);
                let high = p.saturating_add(self.config.psize_window).max(low);
                schedule.psize[index] = rng.random_range(low..=high);
            }
        }
    }
}

impl AnnealProblem for ScheduleAnnealing<'_> {
    type State = Schedule;
    type Error = TuneError;

    fn energy(&self, state: &Schedule) -> Result<f64, TuneError> {
        self.oracle.cost(state)
    }

    fn perturb<R: Rng>(&self, state: &Schedule, rng: &mut R) -> Schedule {
        let mut next = state.clone();
        let bins = next.bins();
        if bins == 0 {
            return next;
        }
        let index = rng.random_range(0..bins);
        match self.scope {
            AnnealScope::Single(variable) => self.resample(&mut next, variable, index, rng),
            AnnealScope::Joint => {
                for variable in Variable::ALL {
                    self.resample(&mut next, variable, index, rng);
                }
            }
        }
        next
    }
}

/// Simulated annealing as a [`ScheduleSearch`] strategy.
pub struct AnnealingSearch {
    config: AnnealConfig,
    rng: StdRng,
}

impl AnnealingSearch {
    /// Creates the strategy; `config` is used as given, so scale it for the
    /// trial count first.
    pub fn new(config: AnnealConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &AnnealConfig {
        &self.config
    }

    /// Anneals all three vectors at once.
    pub fn search_joint(
        &mut self,
        initial: Schedule,
        session: &mut Session<'_>,
    ) -> Result<SearchOutcome, TuneError> {
        self.anneal(initial, AnnealScope::Joint, Target::Joint.label(), session)
    }

    fn anneal(
        &mut self,
        initial: Schedule,
        scope: AnnealScope,
        label: &str,
        session: &mut Session<'_>,
    ) -> Result<SearchOutcome, TuneError> {
        initial.validate()?;
        info!(
            label,
            steps = self.config.steps,
            max_temperature = self.config.max_temperature,
            min_temperature = self.config.min_temperature,
            "Annealing"
        );

        let problem = ScheduleAnnealing::new(session.oracle, scope, &self.config);
        let result = AnnealRunner::run(&problem, initial, &self.config, &mut self.rng)?;

        let improved = result.best_energy < result.initial_energy;
        if improved {
            session.improved(&result.best, label, result.best_energy)?;
        }
        info!(
            accepted = result.accepted_moves,
            improving = result.improving_moves,
            "Annealing finished at {}",
            result.best_energy
        );
        session.notify(&format!(
            "Annealing of {label} finished at {} after {} steps.\nLevel: {}",
            result.best_energy, result.iterations, session.depth
        ));

        Ok(SearchOutcome {
            best: result.best,
            best_cost: result.best_energy,
            initial_cost: result.initial_energy,
            iterations: result.iterations,
            stalled: !improved,
        })
    }
}

impl ScheduleSearch for AnnealingSearch {
    fn name(&self) -> &str {
        "annealing"
    }

    fn search(
        &mut self,
        initial: Schedule,
        variable: Variable,
        session: &mut Session<'_>,
    ) -> Result<SearchOutcome, TuneError> {
        self.anneal(initial, AnnealScope::Single(variable), variable.label(), session)
    }
}
