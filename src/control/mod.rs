//! Run controllers.
//!
//! - [`alternate`]: tunes `A` and `dT` against each other until a full
//!   round brings no improvement.
//! - [`refine`]: wraps alternation in a worklist that splits the widest bin
//!   whenever a level stalls, down to a fixed depth.
//! - [`Tuner`]: validates a [`TuneConfig`](crate::config::TuneConfig),
//!   picks the strategy and dispatches on the target.

mod alternation;
mod branching;
mod tuner;

pub use alternation::{alternate, AlternationOutcome};
pub use branching::{refine, BranchingOutcome, LevelRecord};
pub use tuner::{TuneOutcome, Tuner};
