//! Bin splitting used to raise schedule resolution.

use super::types::Schedule;

/// Index of the longest bin (the first one on ties).
///
/// Returns `None` for an empty schedule.
pub fn widest_bin(schedule: &Schedule) -> Option<usize> {
    let mut widest: Option<(usize, f64)> = None;
    for (i, &dt) in schedule.dt.iter().enumerate() {
        match widest {
            Some((_, w)) if dt <= w => {}
            _ => widest = Some((i, dt)),
        }
    }
    widest.map(|(i, _)| i)
}

/// Splits the longest bin into two equal halves.
///
/// The new bin is inserted directly after the split one and copies its
/// amplitude and population size, so `bins` grows by exactly one.
/// Returns `None` for an empty schedule.
pub fn split_widest_bin(schedule: &Schedule) -> Option<Schedule> {
    let i = widest_bin(schedule)?;
    let half = schedule.dt[i] / 2.0;

    let mut next = schedule.clone();
    next.dt[i] = half;
    next.dt.insert(i + 1, half);
    next.amplitude.insert(i + 1, schedule.amplitude[i]);
    next.psize.insert(i + 1, schedule.psize[i]);
    Some(next)
}
