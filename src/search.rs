//! The seam shared by the coordinate and annealing optimizers.
//!
//! Both implement [`ScheduleSearch`], so the controllers can drive either
//! one without knowing which. A [`Session`] carries the collaborators of the
//! current run (oracle, checkpoint, notifier) explicitly into every call.

use tracing::info;

use crate::error::TuneError;
use crate::hooks::{notify_quietly, Checkpoint, Notifier};
use crate::oracle::Evaluate;
use crate::schedule::{Schedule, Variable};

/// Collaborators of one tuning run.
pub struct Session<'a> {
    /// Scores schedules.
    pub oracle: &'a dyn Evaluate,
    /// Receives every improved schedule.
    pub checkpoint: &'a mut dyn Checkpoint,
    /// Receives progress messages.
    pub notifier: &'a dyn Notifier,
    /// Current branching depth.
    pub depth: usize,
}

impl<'a> Session<'a> {
    pub fn new(
        oracle: &'a dyn Evaluate,
        checkpoint: &'a mut dyn Checkpoint,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            oracle,
            checkpoint,
            notifier,
            depth: 0,
        }
    }

    /// Checkpoints a new best schedule, then announces it.
    ///
    /// Callers invoke this only after the comparison that established the
    /// improvement.
    pub fn improved(&mut self, schedule: &Schedule, label: &str, cost: f64) -> Result<(), TuneError> {
        self.checkpoint.commit(schedule, label, cost)?;
        info!("Found new minimum: {cost}");
        self.notify(&format!("Found new minimum: {cost}"));
        Ok(())
    }

    /// Sends a message; failures are logged and dropped.
    pub fn notify(&self, message: &str) {
        notify_quietly(self.notifier, message);
    }
}

/// Live state of one single-variable tuning run.
#[derive(Debug, Clone)]
pub struct OptimizationState {
    /// Working schedule; always holds the latest committed coordinate values.
    pub current: Schedule,
    /// Best schedule seen so far.
    pub best: Schedule,
    /// Cost of `best`.
    pub best_cost: f64,
    /// Branching depth the run belongs to.
    pub depth: usize,
    /// Set once a full pass brings no improvement.
    pub stalled: bool,
}

impl OptimizationState {
    pub fn new(initial: Schedule, cost: f64, depth: usize) -> Self {
        Self {
            best: initial.clone(),
            current: initial,
            best_cost: cost,
            depth,
            stalled: false,
        }
    }

    /// Records `current` as the best if `cost` is strictly lower.
    pub fn offer(&mut self, cost: f64) -> bool {
        if cost < self.best_cost {
            self.best = self.current.clone();
            self.best_cost = cost;
            true
        } else {
            false
        }
    }
}

/// Result of one [`ScheduleSearch::search`] call.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best schedule found (the initial one if nothing beat it).
    pub best: Schedule,
    /// Cost of `best`.
    pub best_cost: f64,
    /// Cost of the initial schedule.
    pub initial_cost: f64,
    /// Passes (coordinate search) or steps (annealing) executed.
    pub iterations: usize,
    /// Whether the search ended because a pass found nothing better.
    pub stalled: bool,
}

impl SearchOutcome {
    /// Whether the search beat its starting schedule.
    pub fn improved(&self) -> bool {
        self.best_cost < self.initial_cost
    }
}

/// A strategy that tunes one vector of a schedule.
pub trait ScheduleSearch {
    /// Human-readable strategy name.
    fn name(&self) -> &str;

    /// Tunes `variable` starting from `initial`, holding the other vectors
    /// fixed. The schedule is owned by the call and handed back in the
    /// outcome.
    fn search(
        &mut self,
        initial: Schedule,
        variable: Variable,
        session: &mut Session<'_>,
    ) -> Result<SearchOutcome, TuneError>;
}
