//! Command-line front end: tunes a LUT file against an external solver.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use lut_tune::config::{ExperimentMode, StrategyKind, TuneConfig};
use lut_tune::hooks::{CommandNotifier, DataFilePlotter, LogNotifier, LutCheckpoint, Notifier};
use lut_tune::oracle::{FitnessOracle, ProcessSolver, TrialSpec};
use lut_tune::schedule::{format_lut, read_lut, Target, Variable};
use lut_tune::Tuner;

const USAGE: &str = "\
usage: lut-tune <dT|A|psize|all|joint> <mode 0|1|2> [-v] [-m] [-p] [--anneal]
                <initialLUT> <trials.dat> <trials> <tag> [weight runtime]

  -v        log every evaluation
  -m        send progress messages through $LUT_TUNE_NOTIFY_CMD
  -p        write <label>.dat plot files of each evaluated curve
  --anneal  use simulated annealing instead of coordinate search

environment:
  LUT_TUNE_SOLVER        solver program (default ./testrun.pl)
  LUT_TUNE_SOLVER_ARGS   arguments placed before the LUT path (default ./ssmc)
  LUT_TUNE_TIMEOUT_SECS  kill the solver after this many seconds
  LUT_TUNE_NOTIFY_CMD    command receiving messages on stdin (with -m)
  RUST_LOG               log filter";

#[derive(Debug, Clone, PartialEq)]
struct Cli {
    target: Target,
    mode: ExperimentMode,
    verbose: bool,
    mail: bool,
    plot: bool,
    anneal: bool,
    initial: PathBuf,
    trial_list: String,
    trials: u32,
    tag: String,
    weight_runtime: Option<(String, String)>,
}

fn parse_cli(args: impl IntoIterator<Item = String>) -> Result<Cli, String> {
    let (mut verbose, mut mail, mut plot, mut anneal) = (false, false, false, false);
    let mut positional = Vec::new();

    for arg in args {
        match arg.as_str() {
            "-v" => verbose = true,
            "-m" => mail = true,
            "-p" => plot = true,
            "--anneal" => anneal = true,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("unknown flag {flag}"));
            }
            _ => positional.push(arg),
        }
    }

    if positional.len() != 6 && positional.len() != 8 {
        return Err(format!(
            "expected 6 or 8 arguments, got {}",
            positional.len()
        ));
    }
    let mut positional = positional.into_iter();
    let mut next = || positional.next().unwrap_or_default();

    let target = next().parse::<Target>().map_err(|e| e.to_string())?;
    let mode = next().parse::<ExperimentMode>().map_err(|e| e.to_string())?;
    let initial = PathBuf::from(next());
    let trial_list = next();
    let trials_arg = next();
    let trials = trials_arg
        .parse::<u32>()
        .map_err(|_| format!("trials must be a positive integer, got {trials_arg:?}"))?;
    let tag = next();
    let weight = next();
    let runtime = next();
    let weight_runtime = (!weight.is_empty()).then_some((weight, runtime));

    Ok(Cli {
        target,
        mode,
        verbose,
        mail,
        plot,
        anneal,
        initial,
        trial_list,
        trials,
        tag,
        weight_runtime,
    })
}

fn enable_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

fn solver_from_env() -> Result<ProcessSolver> {
    let program = env::var("LUT_TUNE_SOLVER").unwrap_or_else(|_| "./testrun.pl".to_string());
    let prefix = env::var("LUT_TUNE_SOLVER_ARGS").unwrap_or_else(|_| "./ssmc".to_string());
    let mut solver = ProcessSolver::new(program)
        .with_prefix_args(prefix.split_whitespace().map(str::to_string).collect());

    if let Ok(secs) = env::var("LUT_TUNE_TIMEOUT_SECS") {
        let secs: u64 = secs
            .trim()
            .parse()
            .with_context(|| format!("LUT_TUNE_TIMEOUT_SECS must be whole seconds, got {secs:?}"))?;
        solver = solver.with_timeout(Duration::from_secs(secs));
    }
    Ok(solver)
}

fn notifier_for(mail: bool) -> Box<dyn Notifier> {
    if !mail {
        return Box::new(LogNotifier);
    }
    match env::var("LUT_TUNE_NOTIFY_CMD")
        .ok()
        .and_then(|line| CommandNotifier::from_command_line(&line))
    {
        Some(notifier) => Box::new(notifier),
        None => {
            warn!("-m given but LUT_TUNE_NOTIFY_CMD is not set; logging messages instead");
            Box::new(LogNotifier)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let initial = read_lut(&cli.initial)
        .with_context(|| format!("cannot load initial LUT {}", cli.initial.display()))?;

    let strategy = if cli.anneal || cli.target == Target::Joint {
        StrategyKind::Annealing
    } else {
        StrategyKind::Coordinate
    };
    let config = TuneConfig::default()
        .with_target(cli.target)
        .with_mode(cli.mode)
        .with_strategy(strategy)
        .with_trials(cli.trials);
    let tuner = Tuner::new(config).context("invalid configuration")?;

    let mut trial = TrialSpec::new(cli.trial_list, cli.trials, cli.tag.clone());
    if let Some((weight, runtime)) = cli.weight_runtime {
        trial = trial.with_weight_runtime(weight, runtime);
    }
    let mut oracle = FitnessOracle::new(solver_from_env()?, trial).with_verbose(cli.verbose);
    if cli.plot {
        let variable = match cli.target {
            Target::Single(variable) => variable,
            Target::Alternating | Target::Joint => Variable::Amplitude,
        };
        oracle = oracle.with_plotter(Box::new(DataFilePlotter::new(".")), variable);
    }

    let mut checkpoint = LutCheckpoint::new(".", cli.tag.as_str());
    let notifier = notifier_for(cli.mail);

    info!(
        selector = %cli.target,
        mode = %cli.mode,
        ?strategy,
        trials = cli.trials,
        bins = initial.bins(),
        "tune configuration"
    );
    let outcome = tuner.run(initial, &oracle, &mut checkpoint, notifier.as_ref())?;

    info!(
        evaluations = oracle.evaluations(),
        depth = outcome.depth,
        "Best # updates: {}",
        outcome.best_cost
    );
    print!("{}", format_lut(&outcome.best));
    Ok(())
}

fn main() -> ExitCode {
    let cli = match parse_cli(env::args().skip(1)) {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("lut-tune: {message}\n\n{USAGE}");
            return ExitCode::from(1);
        }
    };
    enable_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("lut-tune: {e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_parse_minimal() {
        let cli = parse_cli(args("A 1 init.lut trials.dat 20 run1")).unwrap();
        assert_eq!(cli.target, Target::Single(Variable::Amplitude));
        assert_eq!(cli.mode, ExperimentMode::Shuffle);
        assert_eq!(cli.initial, PathBuf::from("init.lut"));
        assert_eq!(cli.trials, 20);
        assert_eq!(cli.tag, "run1");
        assert!(cli.weight_runtime.is_none());
        assert!(!cli.verbose && !cli.mail && !cli.plot && !cli.anneal);
    }

    #[test]
    fn test_parse_flags_and_weight_runtime() {
        let cli = parse_cli(args("all 0 -v -p --anneal init.lut t.dat 5 tag w.dat 60")).unwrap();
        assert_eq!(cli.target, Target::Alternating);
        assert!(cli.verbose && cli.plot && cli.anneal);
        assert!(!cli.mail);
        assert_eq!(
            cli.weight_runtime,
            Some(("w.dat".to_string(), "60".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_cli(args("A 1 init.lut trials.dat 20")).is_err());
        assert!(parse_cli(args("A 1 init.lut trials.dat 20 tag extra")).is_err());
        assert!(parse_cli(args("A 3 init.lut trials.dat 20 tag")).is_err());
        assert!(parse_cli(args("B 1 init.lut trials.dat 20 tag")).is_err());
        assert!(parse_cli(args("A 1 init.lut trials.dat many tag")).is_err());
        assert!(parse_cli(args("A 1 -x init.lut trials.dat 20 tag")).is_err());
    }
}
