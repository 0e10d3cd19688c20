//! Schedules (LUTs): the per-bin `(dT, A, psize)` table being tuned.
//!
//! A schedule controls an external stochastic solver bin by bin. The
//! tuner only ever changes one schedule at a time; optimizers receive a
//! copy, modify it, and hand it back.

pub mod branch;
pub mod lut;
mod types;

pub use branch::{split_widest_bin, widest_bin};
pub use lut::{format_lut, parse_lut, read_lut, write_lut};
pub use types::{Schedule, Target, Variable, MIN_PSIZE};
