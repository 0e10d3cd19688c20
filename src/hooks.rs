//! Side channels of a tuning run: checkpoints, notifications and plots.
//!
//! Checkpoint failures are real errors. Notification and plot failures
//! are logged and dropped; they never stop a run.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{info, warn};

use crate::error::TuneError;
use crate::schedule::{write_lut, Schedule};

/// Receives the best schedule whenever it improves, plus every branched
/// schedule.
pub trait Checkpoint {
    /// Overwrites the stored best schedule for `label`.
    fn commit(&mut self, schedule: &Schedule, label: &str, cost: f64) -> Result<(), TuneError>;

    /// Stores the schedule a branching level starts from.
    fn persist_level(&mut self, schedule: &Schedule, depth: usize) -> Result<(), TuneError>;
}

/// Writes checkpoints as LUT files: `<tag>.OPTIMAL.<label>.lut` and
/// `<tag>.<depth>.lut`.
#[derive(Debug, Clone)]
pub struct LutCheckpoint {
    dir: PathBuf,
    tag: String,
}

impl LutCheckpoint {
    pub fn new(dir: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            tag: tag.into(),
        }
    }

    pub fn best_path(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{}.OPTIMAL.{}.lut", self.tag, label))
    }

    pub fn level_path(&self, depth: usize) -> PathBuf {
        self.dir.join(format!("{}.{}.lut", self.tag, depth))
    }
}

impl Checkpoint for LutCheckpoint {
    fn commit(&mut self, schedule: &Schedule, label: &str, cost: f64) -> Result<(), TuneError> {
        let path = self.best_path(label);
        write_lut(&path, schedule)?;
        info!("Checkpointed {} (cost {cost}) to {}", label, path.display());
        Ok(())
    }

    fn persist_level(&mut self, schedule: &Schedule, depth: usize) -> Result<(), TuneError> {
        let path = self.level_path(depth);
        write_lut(&path, schedule)?;
        info!("Stored level {depth} schedule to {}", path.display());
        Ok(())
    }
}

/// Keeps every checkpoint in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpoint {
    /// `(label, schedule, cost)` in commit order.
    pub commits: Vec<(String, Schedule, f64)>,
    /// `(depth, schedule)` in persist order.
    pub levels: Vec<(usize, Schedule)>,
}

impl MemoryCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently committed cost.
    pub fn last_cost(&self) -> Option<f64> {
        self.commits.last().map(|c| c.2)
    }
}

impl Checkpoint for MemoryCheckpoint {
    fn commit(&mut self, schedule: &Schedule, label: &str, cost: f64) -> Result<(), TuneError> {
        self.commits.push((label.to_string(), schedule.clone(), cost));
        Ok(())
    }

    fn persist_level(&mut self, schedule: &Schedule, depth: usize) -> Result<(), TuneError> {
        self.levels.push((depth, schedule.clone()));
        Ok(())
    }
}

/// Fire-and-forget progress messages.
pub trait Notifier {
    fn notify(&self, message: &str) -> Result<(), String>;
}

/// Sends `message`, logging and discarding any failure.
pub fn notify_quietly(notifier: &dyn Notifier, message: &str) {
    if let Err(e) = notifier.notify(message) {
        warn!("Notification failed: {e}");
    }
}

/// Drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _message: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Logs every message at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) -> Result<(), String> {
        info!(target: "lut_tune::notify", "{message}");
        Ok(())
    }
}

/// Pipes each message to the stdin of a command, e.g. `mail -s "lut-tune" me@host`.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
}

impl CommandNotifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits a command line on whitespace. Returns `None` if it is blank.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl Notifier for CommandNotifier {
    fn notify(&self, message: &str) -> Result<(), String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn()
            .map_err(|e| format!("cannot start {}: {e}", self.program))?;

        // stdin is dropped before waiting so the child sees EOF.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(message.as_bytes()),
            None => Ok(()),
        };

        let status = child
            .wait()
            .map_err(|e| format!("{} did not finish: {e}", self.program))?;
        written.map_err(|e| format!("cannot write to {}: {e}", self.program))?;
        if status.success() {
            Ok(())
        } else {
            Err(format!("{} exited with {status}", self.program))
        }
    }
}

/// Diagnostic plots of a schedule curve.
pub trait Plotter {
    fn plot(&self, x: &[f64], y: &[f64], label: &str) -> Result<(), String>;
}

/// Writes each series as `x y` lines to `<dir>/<label>.dat`, ready for gnuplot.
#[derive(Debug, Clone)]
pub struct DataFilePlotter {
    dir: PathBuf,
}

impl DataFilePlotter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Plotter for DataFilePlotter {
    fn plot(&self, x: &[f64], y: &[f64], label: &str) -> Result<(), String> {
        let body: String = x
            .iter()
            .zip(y)
            .map(|(x, y)| format!("{x} {y}\n"))
            .collect();
        let path = self.dir.join(format!("{label}.dat"));
        fs::write(&path, body).map_err(|e| format!("cannot write {}: {e}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FailingNotifier {
        attempts: RefCell<usize>,
    }

    impl Notifier for FailingNotifier {
        fn notify(&self, _message: &str) -> Result<(), String> {
            *self.attempts.borrow_mut() += 1;
            Err("smtp down".into())
        }
    }

    #[test]
    fn test_notify_quietly_swallows_failures() {
        let notifier = FailingNotifier {
            attempts: RefCell::new(0),
        };
        notify_quietly(&notifier, "Found new minimum: 12");
        notify_quietly(&notifier, "Found new minimum: 11");
        assert_eq!(*notifier.attempts.borrow(), 2);
    }

    #[test]
    fn test_lut_checkpoint_paths_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let mut checkpoint = LutCheckpoint::new(dir.path(), "run");

        let first = Schedule::uniform(2, 1.0, 0.5, 16);
        let second = Schedule::uniform(2, 1.0, 0.4, 16);
        checkpoint.commit(&first, "A", 10.0).unwrap();
        checkpoint.commit(&second, "A", 9.0).unwrap();
        checkpoint.persist_level(&first, 1).unwrap();

        let best = crate::schedule::read_lut(checkpoint.best_path("A")).unwrap();
        assert_eq!(best, second);
        assert!(dir.path().join("run.OPTIMAL.A.lut").exists());
        assert!(dir.path().join("run.1.lut").exists());
    }

    #[test]
    fn test_data_file_plotter_writes_series() {
        let dir = tempfile::tempdir().unwrap();
        let plotter = DataFilePlotter::new(dir.path());
        plotter.plot(&[0.5, 1.5], &[0.2, 0.4], "A").unwrap();
        let body = fs::read_to_string(dir.path().join("A.dat")).unwrap();
        assert_eq!(body, "0.5 0.2\n1.5 0.4\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_notifier_waits_after_failed_write() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("finished");
        let notifier = CommandNotifier::new(
            "sh",
            vec![
                "-c".into(),
                "exec 0<&-; sleep 0.2; touch \"$1\"".into(),
                "sh".into(),
                marker.display().to_string(),
            ],
        );

        // Larger than any pipe buffer, so the write hits the closed stdin.
        let message = "x".repeat(1 << 20);
        let result = notifier.notify(&message);

        assert!(result.unwrap_err().contains("cannot write to sh"));
        assert!(marker.exists());
    }

    #[test]
    fn test_command_notifier_parsing() {
        assert!(CommandNotifier::from_command_line("   ").is_none());
        let notifier = CommandNotifier::from_command_line("mail -s tune me@host").unwrap();
        assert_eq!(notifier.program, "mail");
        assert_eq!(notifier.args, vec!["-s", "tune", "me@host"]);
    }
}
