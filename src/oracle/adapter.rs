//! Schedule → cost adapter over a [`Solver`].

use std::cell::Cell;

use tracing::{debug, info, warn};

use super::types::{Evaluate, Fitness, Solver, SolverOutcome, TrialSpec};
use crate::error::TuneError;
use crate::hooks::Plotter;
use crate::schedule::{Schedule, Variable};

/// Scores schedules by running the external solver on a fixed trial set.
///
/// Every call validates the schedule first, so a malformed schedule never
/// reaches the solver. Timeouts and unsolved runs are not errors; they come
/// back as [`Fitness::TimedOut`] and [`Fitness::Unsolved`].
pub struct FitnessOracle<S> {
    solver: S,
    trial: TrialSpec,
    plot: Option<(Box<dyn Plotter>, Variable)>,
    verbose: bool,
    evaluations: Cell<usize>,
}

impl<S: Solver> FitnessOracle<S> {
    pub fn new(solver: S, trial: TrialSpec) -> Self {
        Self {
            solver,
            trial,
            plot: None,
            verbose: false,
            evaluations: Cell::new(0),
        }
    }

    /// Plots `variable` against bin time after every evaluation.
    pub fn with_plotter(mut self, plotter: Box<dyn Plotter>, variable: Variable) -> Self {
        self.plot = Some((plotter, variable));
        self
    }

    /// Logs every evaluation at info level instead of debug.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Number of solver invocations so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    pub fn trial(&self) -> &TrialSpec {
        &self.trial
    }

    fn plot(&self, schedule: &Schedule) {
        let Some((plotter, variable)) = &self.plot else {
            return;
        };
        let label = match variable {
            Variable::PopulationSize => "psize",
            _ => "A",
        };
        let y = match variable {
            Variable::PopulationSize => schedule.values(Variable::PopulationSize),
            _ => schedule.amplitude.clone(),
        };
        if let Err(e) = plotter.plot(&schedule.bin_midpoints(), &y, label) {
            warn!("Plot failed: {e}");
        }
    }
}

impl<S: Solver> Evaluate for FitnessOracle<S> {
    fn evaluate(&self, schedule: &Schedule) -> Result<Fitness, TuneError> {
        schedule.validate()?;

        self.evaluations.set(self.evaluations.get() + 1);
        let fitness = match self.solver.run(schedule, &self.trial)? {
            SolverOutcome::Completed(report) => Fitness::from_report(&report),
            SolverOutcome::TimedOut => {
                warn!("Solver timed out on run {}", self.trial.tag);
                Fitness::TimedOut
            }
        };

        self.plot(schedule);

        if self.verbose {
            info!(
                "Tried dT={:?}, A={:?}, psize={:?} with updates={}",
                schedule.dt,
                schedule.amplitude,
                schedule.psize,
                fitness.cost()
            );
        } else {
            debug!(
                "Tried dT={:?}, A={:?}, psize={:?} with updates={}",
                schedule.dt,
                schedule.amplitude,
                schedule.psize,
                fitness.cost()
            );
        }

        Ok(fitness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{SolverReport, PENALTY};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn report(hits: u32, total_updates: f64) -> SolverOutcome {
        SolverOutcome::Completed(SolverReport {
            hits,
            total_updates,
            scale_factor: 2.0,
        })
    }

    fn fixed(
        outcome: SolverOutcome,
    ) -> impl Fn(&Schedule, &TrialSpec) -> Result<SolverOutcome, TuneError> {
        move |_, _| Ok(outcome)
    }

    #[test]
    fn test_mismatch_rejected_before_solver_runs() {
        let calls = Cell::new(0);
        let solver = |_: &Schedule, _: &TrialSpec| -> Result<SolverOutcome, TuneError> {
            calls.set(calls.get() + 1);
            Ok(report(1, 5.0))
        };
        let oracle = FitnessOracle::new(solver, TrialSpec::new("trials.dat", 10, "t"));

        let bad = Schedule {
            dt: vec![1.0, 1.0],
            amplitude: vec![0.5, 0.5],
            psize: vec![16],
        };
        assert!(matches!(
            oracle.evaluate(&bad),
            Err(TuneError::Validation { .. })
        ));
        assert_eq!(calls.get(), 0);
        assert_eq!(oracle.evaluations(), 0);
    }

    #[test]
    fn test_outcomes_are_tagged() {
        let schedule = Schedule::uniform(2, 1.0, 0.5, 16);
        let trial = TrialSpec::new("trials.dat", 10, "t");

        let solved = FitnessOracle::new(fixed(report(4, 120.0)), trial.clone());
        assert_eq!(solved.evaluate(&schedule).unwrap(), Fitness::Solved(120.0));

        let unsolved = FitnessOracle::new(fixed(report(0, 120.0)), trial.clone());
        let fitness = unsolved.evaluate(&schedule).unwrap();
        assert_eq!(
            fitness,
            Fitness::Unsolved {
                updates: 120.0,
                scale: 2.0
            }
        );
        assert!((fitness.cost() - (120.0 + 2.0 * PENALTY)).abs() < 1e-6);

        let timed_out = FitnessOracle::new(fixed(SolverOutcome::TimedOut), trial);
        assert_eq!(timed_out.cost(&schedule).unwrap(), PENALTY);
        assert_eq!(timed_out.evaluations(), 1);
    }

    struct RecordingPlotter {
        calls: Rc<RefCell<Vec<(Vec<f64>, Vec<f64>, String)>>>,
    }

    impl Plotter for RecordingPlotter {
        fn plot(&self, x: &[f64], y: &[f64], label: &str) -> Result<(), String> {
            self.calls
                .borrow_mut()
                .push((x.to_vec(), y.to_vec(), label.to_string()));
            Err("no display".into())
        }
    }

    #[test]
    fn test_plot_failure_does_not_change_cost() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let plotter = RecordingPlotter {
            calls: Rc::clone(&calls),
        };
        let oracle = FitnessOracle::new(fixed(report(1, 42.0)), TrialSpec::new("trials.dat", 1, "t"))
            .with_plotter(Box::new(plotter), Variable::PopulationSize);

        let schedule = Schedule::new(vec![1.0, 3.0], vec![0.5, 0.5], vec![16, 24]).unwrap();
        assert_eq!(oracle.cost(&schedule).unwrap(), 42.0);

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, vec![0.5, 2.5]);
        assert_eq!(calls[0].1, vec![16.0, 24.0]);
        assert_eq!(calls[0].2, "psize");
    }
}
