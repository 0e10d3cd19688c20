//! [`Solver`] backed by an external program.
//!
//! Each run writes `<tag>.lut` into the work directory, invokes
//!
//! ```text
//! <program> [prefix args..] <tag>.lut <trial_list> <trials> <tag> [weight runtime]
//! ```
//!
//! with the work directory as its cwd, and reads `hits updates scale` from
//! `<tag>.txt` once the program exits successfully. Any `<tag>.txt` left
//! by an earlier run is removed first, so a solver that writes nothing
//! fails with an I/O error.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use super::types::{Solver, SolverOutcome, SolverReport, TrialSpec};
use crate::error::TuneError;
use crate::schedule::{write_lut, Schedule};

/// Runs the solver as a child process with an optional wall-clock timeout.
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    program: String,
    prefix_args: Vec<String>,
    work_dir: PathBuf,
    timeout: Option<Duration>,
    poll_interval: Duration,
}

impl ProcessSolver {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
            work_dir: PathBuf::from("."),
            timeout: None,
            poll_interval: Duration::from_millis(50),
        }
    }

    /// Arguments placed before the LUT path (e.g. the solver binary for a
    /// wrapper script).
    pub fn with_prefix_args(mut self, args: Vec<String>) -> Self {
        self.prefix_args = args;
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn arguments(&self, trial: &TrialSpec) -> Vec<String> {
        let mut args = self.prefix_args.clone();
        args.push(format!("{}.lut", trial.tag));
        args.push(trial.trial_list.clone());
        args.push(trial.trials.to_string());
        args.push(trial.tag.clone());
        if let Some((weight, runtime)) = &trial.weight_runtime {
            args.push(weight.clone());
            args.push(runtime.clone());
        }
        args
    }

    fn spawn_error(&self, e: std::io::Error) -> TuneError {
        TuneError::Solver(format!("cannot start {}: {e}", self.program))
    }
}

impl Solver for ProcessSolver {
    fn run(&self, schedule: &Schedule, trial: &TrialSpec) -> Result<SolverOutcome, TuneError> {
        write_lut(self.work_dir.join(format!("{}.lut", trial.tag)), schedule)?;
        let result_path = self.work_dir.join(format!("{}.txt", trial.tag));
        match fs::remove_file(&result_path) {
            Err(e) if e.kind() != ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }

        let args = self.arguments(trial);
        debug!("Running {} {}", self.program, args.join(" "));
        let mut child = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.work_dir)
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let Some(status) = wait_with_timeout(&mut child, self.timeout, self.poll_interval)? else {
            return Ok(SolverOutcome::TimedOut);
        };
        if !status.success() {
            return Err(TuneError::Solver(format!(
                "{} exited with {status}",
                self.program
            )));
        }

        let text = fs::read_to_string(&result_path)?;
        parse_report(&text, &result_path.display().to_string()).map(SolverOutcome::Completed)
    }
}

/// Waits for `child`; `Ok(None)` means it was killed at the deadline.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Option<Duration>,
    poll_interval: Duration,
) -> Result<Option<ExitStatus>, TuneError> {
    let Some(timeout) = timeout else {
        return Ok(Some(child.wait()?));
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(poll_interval);
    }
}

/// Reads `hits totalUpdates scaleFactor`: the first three numbers in `text`.
pub fn parse_report(text: &str, source_name: &str) -> Result<SolverReport, TuneError> {
    let numbers: Vec<f64> = text
        .split_whitespace()
        .filter_map(|token| token.parse::<f64>().ok())
        .take(3)
        .collect();

    let &[hits, total_updates, scale_factor] = numbers.as_slice() else {
        return Err(TuneError::parse(
            source_name,
            format!("expected 3 numbers (hits updates scale), found {}", numbers.len()),
        ));
    };
    if hits < 0.0 || hits.fract() != 0.0 {
        return Err(TuneError::parse(source_name, format!("bad hit count {hits}")));
    }

    Ok(SolverReport {
        hits: hits as u32,
        total_updates,
        scale_factor,
    })
}
