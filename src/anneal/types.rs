//! Core trait for simulated annealing.

use rand::Rng;

/// Defines an annealing problem.
///
/// The implementor supplies the perturbation move and the energy; the
/// [`AnnealRunner`](super::AnnealRunner) handles temperature, acceptance
/// and best-state tracking. Energy evaluation may fail (an oracle call can),
/// in which case the run aborts with that error.
///
/// # Minimization
///
/// Annealing minimizes the energy. For maximization, negate it.
pub trait AnnealProblem {
    /// The state representation.
    type State: Clone;

    /// Error raised by energy evaluation.
    type Error;

    /// Computes the energy of a state. Lower is better.
    fn energy(&self, state: &Self::State) -> Result<f64, Self::Error>;

    /// Generates a nearby state.
    ///
    /// Every state in the domain should be reachable through a sequence of
    /// perturbations.
    fn perturb<R: Rng>(&self, state: &Self::State, rng: &mut R) -> Self::State;
}
