//! Plain-text LUT codec.
//!
//! ```text
//! # optional comments
//! 3
//! 0 1.0 0.5 16
//! 1 1.0 0.5 16
//! 2 1.0 0.5 16
//! ```
//!
//! The first content line holds the bin count, followed by one
//! `index dT A psize` record per bin with indices in ascending order.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::types::Schedule;
use crate::error::TuneError;

/// Renders a schedule in LUT form.
pub fn format_lut(schedule: &Schedule) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", schedule.bins());
    for i in 0..schedule.bins() {
        let _ = writeln!(
            out,
            "{} {} {} {}",
            i, schedule.dt[i], schedule.amplitude[i], schedule.psize[i]
        );
    }
    out
}

/// Parses LUT text. `source_name` only labels errors.
pub fn parse_lut(text: &str, source_name: &str) -> Result<Schedule, TuneError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.split('#').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty());

    let (n, header) = lines
        .next()
        .ok_or_else(|| TuneError::parse(source_name, "empty LUT"))?;
    let bins: usize = header
        .parse()
        .map_err(|_| TuneError::parse(source_name, format!("line {n}: bad bin count {header:?}")))?;

    let mut schedule = Schedule {
        dt: Vec::with_capacity(bins),
        amplitude: Vec::with_capacity(bins),
        psize: Vec::with_capacity(bins),
    };

    for (n, line) in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(TuneError::parse(
                source_name,
                format!("line {n}: expected 4 fields, found {}", fields.len()),
            ));
        }
        let bad = |what: &str| TuneError::parse(source_name, format!("line {n}: bad {what}"));

        let index: usize = fields[0].parse().map_err(|_| bad("index"))?;
        if index != schedule.bins() {
            return Err(TuneError::parse(
                source_name,
                format!("line {n}: expected bin {}, found {index}", schedule.bins()),
            ));
        }
        schedule.dt.push(fields[1].parse().map_err(|_| bad("dT"))?);
        schedule.amplitude.push(fields[2].parse().map_err(|_| bad("A"))?);
        schedule.psize.push(fields[3].parse().map_err(|_| bad("psize"))?);
    }

    if schedule.bins() != bins {
        return Err(TuneError::parse(
            source_name,
            format!("header declares {bins} bins, found {}", schedule.bins()),
        ));
    }
    schedule
        .check_domain()
        .map_err(|e| TuneError::parse(source_name, e.to_string()))?;
    Ok(schedule)
}

/// Reads a LUT file.
pub fn read_lut(path: impl AsRef<Path>) -> Result<Schedule, TuneError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse_lut(&text, &path.display().to_string())
}

/// Writes a LUT file, replacing any previous content.
pub fn write_lut(path: impl AsRef<Path>, schedule: &Schedule) -> Result<(), TuneError> {
    schedule.validate()?;
    fs::write(path, format_lut(schedule))?;
    Ok(())
}
