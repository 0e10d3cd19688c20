//! Annealing execution loop.

use rand::Rng;
use tracing::trace;

use super::config::AnnealConfig;
use super::types::AnnealProblem;

/// Result of an annealing run.
#[derive(Debug, Clone)]
pub struct AnnealResult<S: Clone> {
    /// The best state found.
    pub best: S,

    /// Energy of the best state.
    pub best_energy: f64,

    /// Energy of the starting state.
    pub initial_energy: f64,

    /// Number of perturbations evaluated.
    pub iterations: usize,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of strictly improving moves.
    pub improving_moves: usize,

    /// Best energy sampled at regular intervals.
    pub energy_history: Vec<f64>,
}

/// Metropolis acceptance probability of a move changing the energy by
/// `delta` at `temperature`.
///
/// Strictly downhill moves are always accepted. Uphill moves are accepted
/// with probability `exp(-delta / temperature)`; at zero temperature never.
pub fn acceptance_probability(delta: f64, temperature: f64) -> f64 {
    if delta < 0.0 {
        1.0
    } else if temperature > 0.0 {
        (-delta / temperature).exp()
    } else {
        0.0
    }
}

/// Executes simulated annealing.
pub struct AnnealRunner;

impl AnnealRunner {
    /// Runs annealing from `initial` with the caller's random source.
    ///
    /// The configuration must already be validated.
    pub fn run<P: AnnealProblem, R: Rng>(
        problem: &P,
        initial: P::State,
        config: &AnnealConfig,
        rng: &mut R,
    ) -> Result<AnnealResult<P::State>, P::Error> {
        let mut current = initial;
        let mut current_energy = problem.energy(&current)?;
        let initial_energy = current_energy;
        let mut best = current.clone();
        let mut best_energy = current_energy;

        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;

        let history_interval = (config.steps / 100).max(1);
        let mut energy_history = vec![best_energy];

        for step in 0..config.steps {
            let temperature = config.temperature(step);
            let candidate = problem.perturb(&current, rng);
            let candidate_energy = problem.energy(&candidate)?;
            let delta = candidate_energy - current_energy;

            let accept = if delta < 0.0 {
                improving_moves += 1;
                true
            } else {
                rng.random_range(0.0..1.0) < acceptance_probability(delta, temperature)
            };

            if accept {
                current = candidate;
                current_energy = candidate_energy;
                accepted_moves += 1;

                if current_energy < best_energy {
                    best = current.clone();
                    best_energy = current_energy;
                }
            }

            trace!(step, temperature, energy = current_energy, accept, "anneal step");

            if (step + 1) % history_interval == 0 {
                energy_history.push(best_energy);
            }
        }

        if energy_history
            .last()
            .is_none_or(|&last| (last - best_energy).abs() > 1e-15)
        {
            energy_history.push(best_energy);
        }

        Ok(AnnealResult {
            best,
            best_energy,
            initial_energy,
            iterations: config.steps,
            accepted_moves,
            improving_moves,
            energy_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::convert::Infallible;

    // ---- Quadratic minimization: f(x) = x^2, minimum at 0 ----

    struct QuadraticProblem;

    impl AnnealProblem for QuadraticProblem {
        type State = f64;
        type Error = Infallible;

        fn energy(&self, x: &f64) -> Result<f64, Infallible> {
            Ok(x * x)
        }

        fn perturb<R: Rng>(&self, x: &f64, rng: &mut R) -> f64 {
            x + rng.random_range(-1.0..1.0)
        }
    }

    fn cold_config(steps: usize) -> AnnealConfig {
        AnnealConfig::default()
            .with_max_temperature(10.0)
            .with_min_temperature(0.001)
            .with_steps(steps)
    }

    #[test]
    fn test_downhill_always_accepted() {
        for temperature in [0.0, 1e-9, 1.0, 1e6] {
            assert_eq!(acceptance_probability(-0.5, temperature), 1.0);
            assert_eq!(acceptance_probability(-1e6, temperature), 1.0);
        }
    }

    #[test]
    fn test_uphill_acceptance_falls_with_temperature() {
        let delta = 2.0;
        let temperatures = [1e6, 1e3, 10.0, 1.0, 0.1];
        for pair in temperatures.windows(2) {
            let hot = acceptance_probability(delta, pair[0]);
            let cold = acceptance_probability(delta, pair[1]);
            assert!(cold < hot, "{cold} !< {hot} at T {} -> {}", pair[0], pair[1]);
        }
        assert_eq!(acceptance_probability(delta, 0.0), 0.0);
    }

    #[test]
    fn test_quadratic_converges() {
        let mut rng = StdRng::seed_from_u64(42);
        let result = AnnealRunner::run(&QuadraticProblem, 8.0, &cold_config(5_000), &mut rng)
            .unwrap();

        assert!(
            result.best_energy < 1.0,
            "expected near-zero energy, got {}",
            result.best_energy
        );
        assert_eq!(result.initial_energy, 64.0);
        assert_eq!(result.iterations, 5_000);
        assert!(result.improving_moves > 0);
        assert!(result.accepted_moves >= result.improving_moves);
    }

    #[test]
    fn test_best_never_worse_than_initial() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = AnnealConfig::default()
            .with_max_temperature(1e6)
            .with_min_temperature(1e5)
            .with_steps(200);
        let result = AnnealRunner::run(&QuadraticProblem, 0.0, &config, &mut rng).unwrap();
        assert_eq!(result.best, 0.0);
        assert_eq!(result.best_energy, 0.0);
    }

    #[test]
    fn test_energy_history_non_increasing() {
        let mut rng = StdRng::seed_from_u64(42);
        let result = AnnealRunner::run(&QuadraticProblem, 5.0, &cold_config(1_000), &mut rng)
            .unwrap();

        for window in result.energy_history.windows(2) {
            assert!(
                window[1] <= window[0] + 1e-10,
                "best energy history should be non-increasing: {} > {}",
                window[1],
                window[0]
            );
        }
    }

    #[test]
    fn test_high_temperature_accepts_uphill() {
        let mut rng = StdRng::seed_from_u64(42);
        let config = AnnealConfig::default()
            .with_max_temperature(1e8)
            .with_min_temperature(1e7)
            .with_steps(1_000);
        let result = AnnealRunner::run(&QuadraticProblem, 0.0, &config, &mut rng).unwrap();

        let acceptance_ratio = result.accepted_moves as f64 / result.iterations as f64;
        assert!(
            acceptance_ratio > 0.8,
            "expected high acceptance at high temp, got {acceptance_ratio}"
        );
    }

    #[test]
    fn test_energy_error_aborts() {
        struct Failing;

        impl AnnealProblem for Failing {
            type State = u32;
            type Error = String;

            fn energy(&self, x: &u32) -> Result<f64, String> {
                if *x >= 3 {
                    Err("oracle down".into())
                } else {
                    Ok(-f64::from(*x))
                }
            }

            fn perturb<R: Rng>(&self, x: &u32, _rng: &mut R) -> u32 {
                x + 1
            }
        }

        let mut rng = StdRng::seed_from_u64(1);
        let result = AnnealRunner::run(&Failing, 0, &cold_config(10), &mut rng);
        assert_eq!(result.err(), Some("oracle down".to_string()));
    }
}
