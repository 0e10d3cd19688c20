//! Bounded per-coordinate local search.
//!
//! Each pass visits the coordinates of one schedule vector (in sweep or
//! shuffled order) and minimizes the oracle cost along that coordinate with
//! Brent's bounded method, holding every other value fixed. Amplitude bounds
//! come from the [`BoundEstimator`](crate::bounds::BoundEstimator); time
//! deltas either move a bin boundary or take a fixed range, depending on the
//! [`ExperimentMode`](crate::config::ExperimentMode).
//!
//! # References
//!
//! - Brent (1973), "Algorithms for Minimization without Derivatives"
//! - Wright (2015), "Coordinate Descent Algorithms"

pub mod brent;
mod config;
mod runner;

pub use brent::{minimize_bounded, Minimum};
pub use config::LocalConfig;
pub use runner::CoordinateSearch;
