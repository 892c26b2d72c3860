//! Population based metaheuristics in pure Rust using ndarray
//!
//! Every optimizer follows the same lifecycle: construct it from a validated
//! configuration, `setup()` the problem specific callables, `optimize()` for a
//! fixed number of iterations, then read the best solution back.
//!
//! Supported algorithms:
//! - Particle Swarm Optimization with annealed inertia and clipped initial velocities
//! - Ant Colony Optimization building Hamiltonian paths over a weighted graph
//! - Evolution Strategies: antithetic gradient estimation and a diagonal Gaussian
//!   estimation-of-distribution variant
//! - Artificial Fish Swarm with prey, swarm and follow behaviours
//! - Simulated Annealing with logistic (Metropolis style) acceptance
//!
//! Fitness is higher-is-better for PSO, AFS and SA, lower-is-better for both ES
//! variants, and ACO minimizes tour distance.

pub mod error;
pub mod hooks;
pub mod init;
pub mod recorder;

pub mod argbest;
pub mod quantile;
pub mod softmax;
pub mod vector_ops;

pub mod aco;
pub mod afs;
pub mod es;
pub mod gaussian_es;
pub mod pso;
pub mod sa;

pub mod registry;
pub mod solver;


pub use aco::{AcoConfig, AcoConfigBuilder, Ant, AntColony};
pub use afs::{AfsConfig, AfsConfigBuilder, ArtificialFishSwarm, Fish};
pub use error::{HeuristicError, Result};
pub use es::{EsConfig, EsConfigBuilder, EvolutionStrategy};
pub use gaussian_es::{GaussianEs, GaussianEsConfig, GaussianEsConfigBuilder};
pub use hooks::{Clip, Fallible, Fitness, Repair, Sampler, ScalarSampler};
pub use pso::{ParticleSwarm, PsoConfig, PsoConfigBuilder};
pub use recorder::{IterationRecord, Trajectory};
pub use registry::Registry;
pub use sa::{SaConfig, SaConfigBuilder, SimulatedAnnealing};
pub use solver::{Report, Solver};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Build the generator used by one `optimize()` call.
///
/// A fixed seed reproduces the whole run; without one the generator is seeded
/// from the thread RNG.
pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
	match seed {
		Some(s) => StdRng::seed_from_u64(s),
		None => {
			let mut thread_rng = rand::rng();
			StdRng::from_rng(&mut thread_rng)
		}
	}
}

/// True when progress should be logged for this (zero based) iteration.
pub(crate) fn should_log(log_every: usize, iter: usize) -> bool {
	log_every > 0 && iter % log_every == 0
}
