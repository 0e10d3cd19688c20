//! Schedule (LUT) tuner for stochastic solvers.
//!
//! A schedule is a per-bin table of time deltas (`dT`), amplitudes (`A`)
//! and population sizes (`psize`) that drives an external solver. Its
//! fitness is the solver's mean update count to a solution, so every
//! evaluation is an expensive black-box call. This crate searches for a
//! schedule that minimizes it:
//!
//! - **Fitness oracle**: adapts the solver to a single cost, mapping
//!   timeouts and unsolved trials onto costs that always lose to a solve.
//! - **Bound estimator**: derives per-bin amplitude search intervals from
//!   the local slope of the curve.
//! - **Coordinate search**: one bounded Brent minimization per coordinate,
//!   in sweep or shuffled order.
//! - **Simulated annealing**: Metropolis acceptance with geometric cooling,
//!   over one vector or all three at once.
//! - **Alternation and branching**: tune `A` and `dT` in turn; when a level
//!   stalls, split the widest bin and try again, up to a fixed depth.
//!
//! # Architecture
//!
//! Both optimizers implement [`search::ScheduleSearch`]; the controllers in
//! [`control`] drive either one through a [`search::Session`] carrying the
//! oracle, checkpoint and notifier of the run. Everything is synchronous
//! and single-threaded: at most one solver call is in flight.

pub mod anneal;
pub mod bounds;
pub mod config;
pub mod control;
pub mod error;
pub mod hooks;
pub mod local;
pub mod oracle;
pub mod schedule;
pub mod search;

pub use config::TuneConfig;
pub use control::{TuneOutcome, Tuner};
pub use error::TuneError;
pub use schedule::{Schedule, Target, Variable};
