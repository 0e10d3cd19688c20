//! Resolution refinement when alternation stalls.
//!
//! # Algorithm
//!
//! The worklist holds `(schedule, depth)` entries, starting with the
//! initial schedule at depth 0. For each entry:
//!
//! 1. At the recursion limit, evaluate the schedule once and finish
//! 2. Otherwise run [`alternate`]; if it improved anything, finish
//! 3. Otherwise split the widest bin, persist the expanded schedule for the
//!    next depth, announce it, and push it onto the worklist
//!
//! The deepest level reached supplies the final schedule and cost.

use std::collections::VecDeque;

use tracing::info;

use super::alternation::alternate;
use crate::error::TuneError;
use crate::schedule::{split_widest_bin, Schedule};
use crate::search::{ScheduleSearch, Session};

/// What happened at one branching depth.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelRecord {
    /// Branching depth, 0 for the initial schedule.
    pub depth: usize,
    /// Bin count at this depth.
    pub bins: usize,
    /// Best cost reached at this depth.
    pub cost: f64,
    /// False at the recursion limit, where the schedule is only evaluated.
    pub searched: bool,
    /// Whether alternation improved on the schedule it was given.
    pub changed: bool,
}

/// Result of [`refine`].
#[derive(Debug, Clone)]
pub struct BranchingOutcome {
    /// Schedule of the deepest level reached.
    pub best: Schedule,
    /// Cost of `best`.
    pub best_cost: f64,
    /// Deepest level reached.
    pub depth: usize,
    /// One record per level, shallowest first.
    pub levels: Vec<LevelRecord>,
}

/// Alternates `A`/`dT` tuning, splitting the widest bin whenever a level
/// ends without improvement, down to `limit` levels.
pub fn refine(
    search: &mut dyn ScheduleSearch,
    initial: Schedule,
    limit: usize,
    max_rounds: usize,
    session: &mut Session<'_>,
) -> Result<BranchingOutcome, TuneError> {
    let mut worklist = VecDeque::from([(initial, 0usize)]);
    let mut levels = Vec::new();

    while let Some((schedule, depth)) = worklist.pop_front() {
        session.depth = depth;

        if depth >= limit {
            let cost = session.oracle.cost(&schedule)?;
            info!("Reached recursion limit {limit} with {} bins, cost {cost}", schedule.bins());
            levels.push(LevelRecord {
                depth,
                bins: schedule.bins(),
                cost,
                searched: false,
                changed: false,
            });
            return Ok(BranchingOutcome {
                best: schedule,
                best_cost: cost,
                depth,
                levels,
            });
        }

        let outcome = alternate(search, schedule, max_rounds, session)?;
        levels.push(LevelRecord {
            depth,
            bins: outcome.best.bins(),
            cost: outcome.best_cost,
            searched: true,
            changed: outcome.changed,
        });

        let expanded = if outcome.changed {
            None
        } else {
            split_widest_bin(&outcome.best)
        };
        match expanded {
            Some(next) => {
                let next_depth = depth + 1;
                session.checkpoint.persist_level(&next, next_depth)?;
                info!("Recursing down to level {next_depth} with {} bins", next.bins());
                session.notify(&format!("Recursing down to level {next_depth}"));
                worklist.push_back((next, next_depth));
            }
            None => {
                return Ok(BranchingOutcome {
                    best: outcome.best,
                    best_cost: outcome.best_cost,
                    depth,
                    levels,
                });
            }
        }
    }

    unreachable!("every worklist entry either returns or queues its successor")
}
