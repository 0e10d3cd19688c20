//! Fitness oracle: scores a schedule by running the external solver.
//!
//! The solver is a black box behind the [`Solver`] trait. [`FitnessOracle`]
//! adapts it to the [`Evaluate`] interface every optimizer uses, turning
//! timeouts and runs where nothing solved into tagged [`Fitness`] values
//! whose costs always lose to a genuine solve.

mod adapter;
pub mod process;
mod types;

pub use adapter::FitnessOracle;
pub use process::ProcessSolver;
pub use types::{
    Evaluate, Fitness, Solver, SolverOutcome, SolverReport, TrialSpec, PENALTY,
};
