//! Alternating `A`/`dT` tuning.
//!
//! # Algorithm
//!
//! 1. Evaluate the starting schedule; it is the first best
//! 2. Each round:
//!    a. Tune `A` with `dT` held fixed, starting from the best schedule
//!    b. Tune `dT` with `A` held fixed, starting from the (possibly new) best
//!    c. After each half-round, checkpoint the schedule if it beats the best
//! 3. Stop after a round without improvement, or after `max_rounds`

use tracing::{debug, info};

use crate::error::TuneError;
use crate::schedule::{Schedule, Target, Variable};
use crate::search::{ScheduleSearch, Session};

/// Order in which one round visits the vectors.
const ROUND: [Variable; 2] = [Variable::Amplitude, Variable::DeltaT];

/// Result of [`alternate`].
#[derive(Debug, Clone)]
pub struct AlternationOutcome {
    /// Best schedule found (the starting one if nothing beat it).
    pub best: Schedule,
    /// Cost of `best`.
    pub best_cost: f64,
    /// Cost of the starting schedule.
    pub initial_cost: f64,
    /// Whether any half-round improved on the starting cost.
    pub changed: bool,
    /// Rounds executed, including the final one without improvement.
    pub rounds: usize,
}

/// Tunes `A` and `dT` against each other until a full round brings no
/// improvement.
pub fn alternate(
    search: &mut dyn ScheduleSearch,
    initial: Schedule,
    max_rounds: usize,
    session: &mut Session<'_>,
) -> Result<AlternationOutcome, TuneError> {
    let initial_cost = session.oracle.cost(&initial)?;
    let mut best = initial;
    let mut best_cost = initial_cost;
    let mut rounds = 0;

    while rounds < max_rounds {
        rounds += 1;
        let mut improved = false;

        for variable in ROUND {
            let outcome = search.search(best.clone(), variable, session)?;
            debug!(
                round = rounds,
                %variable,
                cost = outcome.best_cost,
                strategy = search.name(),
                "half-round finished"
            );
            if outcome.best_cost < best_cost {
                best = outcome.best;
                best_cost = outcome.best_cost;
                session.improved(&best, Target::Alternating.label(), best_cost)?;
                improved = true;
            }
        }

        info!(round = rounds, depth = session.depth, "Round finished at {best_cost}");
        if !improved {
            break;
        }
    }

    Ok(AlternationOutcome {
        changed: best_cost < initial_cost,
        best,
        best_cost,
        initial_cost,
        rounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{MemoryCheckpoint, SilentNotifier};
    use crate::oracle::{Evaluate, Fitness};
    use crate::search::SearchOutcome;

    struct AmplitudeOracle;

    impl Evaluate for AmplitudeOracle {
        fn evaluate(&self, schedule: &Schedule) -> Result<Fitness, TuneError> {
            schedule.validate()?;
            let a: f64 = schedule.amplitude.iter().map(|a| (a - 0.3).powi(2)).sum();
            let t: f64 = schedule.dt.iter().map(|d| (d - 2.0).powi(2)).sum();
            Ok(Fitness::Solved(a + t))
        }
    }

    /// Jumps a vector straight to a target value, once per variable, and
    /// records the visiting order.
    struct Scripted {
        calls: Vec<Variable>,
        improve: bool,
    }

    impl ScheduleSearch for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn search(
            &mut self,
            initial: Schedule,
            variable: Variable,
            session: &mut Session<'_>,
        ) -> Result<SearchOutcome, TuneError> {
            self.calls.push(variable);
            let initial_cost = session.oracle.cost(&initial)?;
            let best = if self.improve {
                let target = match variable {
                    Variable::Amplitude => 0.3,
                    Variable::DeltaT => 2.0,
                    Variable::PopulationSize => 16.0,
                };
                let values = vec![target; initial.bins()];
                initial.with_values(variable, &values)
            } else {
                initial
            };
            let best_cost = session.oracle.cost(&best)?;
            Ok(SearchOutcome {
                best,
                best_cost,
                initial_cost,
                iterations: 1,
                stalled: best_cost >= initial_cost,
            })
        }
    }

    #[test]
    fn test_alternates_until_round_without_improvement() {
        let oracle = AmplitudeOracle;
        let mut checkpoint = MemoryCheckpoint::new();
        let notifier = SilentNotifier;
        let mut session = Session::new(&oracle, &mut checkpoint, &notifier);

        let mut search = Scripted {
            calls: Vec::new(),
            improve: true,
        };
        let outcome = alternate(
            &mut search,
            Schedule::uniform(2, 1.0, 0.5, 16),
            100,
            &mut session,
        )
        .unwrap();

        assert!(outcome.changed);
        assert_eq!(outcome.rounds, 2);
        assert!(outcome.best_cost.abs() < 1e-12);
        assert!((outcome.initial_cost - 2.08).abs() < 1e-9);
        assert_eq!(
            search.calls,
            vec![
                Variable::Amplitude,
                Variable::DeltaT,
                Variable::Amplitude,
                Variable::DeltaT
            ]
        );

        let labels: Vec<&str> = checkpoint.commits.iter().map(|c| c.0.as_str()).collect();
        assert_eq!(labels, vec!["both", "both"]);
        assert_eq!(checkpoint.last_cost(), Some(outcome.best_cost));
    }

    #[test]
    fn test_unchanged_when_nothing_improves() {
        let oracle = AmplitudeOracle;
        let mut checkpoint = MemoryCheckpoint::new();
        let notifier = SilentNotifier;
        let mut session = Session::new(&oracle, &mut checkpoint, &notifier);

        let mut search = Scripted {
            calls: Vec::new(),
            improve: false,
        };
        let initial = Schedule::uniform(2, 1.0, 0.5, 16);
        let outcome = alternate(&mut search, initial.clone(), 100, &mut session).unwrap();

        assert!(!outcome.changed);
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.best, initial);
        assert!(checkpoint.commits.is_empty());
    }

    #[test]
    fn test_round_limit() {
        let oracle = AmplitudeOracle;
        let mut checkpoint = MemoryCheckpoint::new();
        let notifier = SilentNotifier;
        let mut session = Session::new(&oracle, &mut checkpoint, &notifier);

        let mut search = Scripted {
            calls: Vec::new(),
            improve: true,
        };
        let outcome = alternate(
            &mut search,
            Schedule::uniform(1, 1.0, 0.5, 16),
            1,
            &mut session,
        )
        .unwrap();
        assert_eq!(outcome.rounds, 1);
        assert_eq!(search.calls.len(), 2);
        assert!(outcome.changed);
    }
}
