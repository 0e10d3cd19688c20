//! Simulated annealing.
//!
//! Resamples one coordinate (or, jointly, one whole bin) at a time and
//! accepts worsening moves with a Metropolis probability that shrinks as
//! the temperature cools geometrically. [`AnnealingSearch`] exposes it
//! through the same [`ScheduleSearch`](crate::search::ScheduleSearch)
//! interface as the coordinate search.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast
//!   Computing Machines"

mod config;
mod problem;
mod runner;
mod types;

pub use config::AnnealConfig;
pub use problem::{AnnealScope, AnnealingSearch, ScheduleAnnealing};
pub use runner::{acceptance_probability, AnnealResult, AnnealRunner};
pub use types::AnnealProblem;
