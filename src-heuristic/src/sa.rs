//! Simulated Annealing at a fixed temperature (maximizes fitness)
//!
//! Each iteration perturbs the current individual with standard normal noise
//! and accepts the candidate with the logistic probability
//! `1 / (1 + exp(delta / temperature))`, where `delta = current - candidate`
//! is the energy change. An improving candidate is accepted with probability
//! above one half, a worsening one below, and the iteration counter advances
//! either way.

use ndarray::Array1;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::error::{ensure, HeuristicError, Result};
use crate::hooks::{Fitness, Sampler};
use crate::recorder::Trajectory;
use crate::{seeded_rng, should_log};

/// Configuration for simulated annealing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SaConfig {
	/// Constant temperature, must be positive
	pub temperature: f64,
	pub max_iter: usize,
	pub seed: Option<u64>,
	/// Log progress every n iterations (0 = never)
	pub log_every: usize,
}

impl Default for SaConfig {
	fn default() -> Self {
		Self { temperature: 1.0, max_iter: 1000, seed: None, log_every: 100 }
	}
}

impl SaConfig {
	pub(crate) fn validate(&self) -> Result<()> {
		ensure(self.max_iter > 0, "max_iter must be at least 1")?;
		ensure(
			self.temperature.is_finite() && self.temperature > 0.0,
			format!("temperature must be positive, got {}", self.temperature),
		)
	}
}

/// Fluent builder for `SaConfig`
#[derive(Default)]
pub struct SaConfigBuilder {
	cfg: SaConfig,
}

impl SaConfigBuilder {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn temperature(mut self, v: f64) -> Self {
		self.cfg.temperature = v;
		self
	}
	pub fn max_iter(mut self, v: usize) -> Self {
		self.cfg.max_iter = v;
		self
	}
	pub fn seed(mut self, v: u64) -> Self {
		self.cfg.seed = Some(v);
		self
	}
	pub fn log_every(mut self, v: usize) -> Self {
		self.cfg.log_every = v;
		self
	}
	pub fn build(self) -> SaConfig {
		self.cfg
	}
}

/// Logistic acceptance probability for an energy change `delta`.
///
/// Exactly 0.5 when `delta == 0`, tends to 1 for large negative `delta`
/// (improvements) and to 0 for large positive ones.
pub fn acceptance_probability(delta: f64, temperature: f64) -> f64 {
	1.0 / (1.0 + (delta / temperature).exp())
}

struct SaHooks<'a> {
	fitness: Box<dyn Fitness + 'a>,
	initialization: Box<dyn Sampler + 'a>,
}

/// Single-individual simulated annealing
pub struct SimulatedAnnealing<'a> {
	config: SaConfig,
	hooks: Option<SaHooks<'a>>,
	individual: Option<Array1<f64>>,
	fitness: f64,
	best_individual: Option<Array1<f64>>,
	best_fitness: f64,
	accepted: usize,
	evaluations: usize,
	trajectory: Trajectory,
}

impl<'a> SimulatedAnnealing<'a> {
	pub fn new(config: SaConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			config,
			hooks: None,
			individual: None,
			fitness: f64::NEG_INFINITY,
			best_individual: None,
			best_fitness: f64::NEG_INFINITY,
			accepted: 0,
			evaluations: 0,
			trajectory: Trajectory::new(),
		})
	}

	pub fn setup(&mut self, fitness: impl Fitness + 'a, initialization: impl Sampler + 'a) -> &mut Self {
		self.hooks = Some(SaHooks { fitness: Box::new(fitness), initialization: Box::new(initialization) });
		self
	}

	pub fn optimize(&mut self) -> Result<&Self> {
		let hooks = self.hooks.as_mut().ok_or(HeuristicError::NotConfigured("SimulatedAnnealing"))?;
		let cfg = &self.config;
		let mut rng = seeded_rng(cfg.seed);

		let mut individual = hooks.initialization.sample(&mut rng);
		let dim = individual.len();
		let mut fitness = hooks.fitness.evaluate(&individual)?;
		let mut best_individual = individual.clone();
		let mut best_fitness = fitness;
		self.evaluations = 1;
		self.accepted = 0;
		self.trajectory.clear();

		for iter in 0..cfg.max_iter {
			let noise: Array1<f64> = Array1::from_shape_fn(dim, |_| StandardNormal.sample(&mut rng));
			let candidate = &individual + &noise;
			let candidate_fitness = hooks.fitness.evaluate(&candidate)?;
			self.evaluations += 1;

			let p = acceptance_probability(fitness - candidate_fitness, cfg.temperature);
			if p.is_nan() {
				return Err(HeuristicError::Numerical(format!(
					"acceptance probability is NaN (current={}, candidate={})",
					fitness, candidate_fitness
				)));
			}

			let mut improved = false;
			if rng.random::<f64>() < p {
				individual = candidate;
				fitness = candidate_fitness;
				self.accepted += 1;
				if fitness > best_fitness {
					best_individual = individual.clone();
					best_fitness = fitness;
					improved = true;
				}
			}
			self.trajectory.push(iter + 1, best_fitness, improved);
			if should_log(cfg.log_every, iter) {
				log::debug!(
					"SA iter {:5}  T={:.3}  current={:.6e}  best={:.6e}",
					iter,
					cfg.temperature,
					fitness,
					best_fitness
				);
			}
		}

		log::info!(
			"SA finished: {} iterations, {} accepted, best fitness {:.6e}",
			cfg.max_iter,
			self.accepted,
			best_fitness
		);
		self.individual = Some(individual);
		self.fitness = fitness;
		self.best_individual = Some(best_individual);
		self.best_fitness = best_fitness;
		Ok(&*self)
	}

	/// Individual held at the end of the run
	pub fn individual(&self) -> Option<&Array1<f64>> {
		self.individual.as_ref()
	}

	pub fn fitness(&self) -> f64 {
		self.fitness
	}

	pub fn best_individual(&self) -> Option<&Array1<f64>> {
		self.best_individual.as_ref()
	}

	/// Best fitness seen, the initial individual included; `-inf` before the first run
	pub fn best_fitness(&self) -> f64 {
		self.best_fitness
	}

	/// Number of accepted moves in the last run
	pub fn accepted(&self) -> usize {
		self.accepted
	}

	pub fn evaluations(&self) -> usize {
		self.evaluations
	}

	pub fn trajectory(&self) -> &Trajectory {
		&self.trajectory
	}

	pub fn config(&self) -> &SaConfig {
		&self.config
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hooks::Fallible;
	use crate::init::constant;

	#[test]
	fn test_acceptance_probability() {
		assert_eq!(acceptance_probability(0.0, 2.0), 0.5);
		assert!(acceptance_probability(-1.0, 1.0) > 0.5);
		assert!(acceptance_probability(1.0, 1.0) < 0.5);
		assert_eq!(acceptance_probability(1e6, 1.0), 0.0);
		assert_eq!(acceptance_probability(-1e6, 1.0), 1.0);
	}

	#[test]
	fn test_every_iteration_counts() {
		let cfg = SaConfigBuilder::new().temperature(0.5).max_iter(200).seed(3).build();
		let mut sa = SimulatedAnnealing::new(cfg).unwrap();
		sa.setup(|x: &Array1<f64>| -x.dot(x), constant(Array1::from(vec![4.0, -4.0])));
		sa.optimize().unwrap();
		assert_eq!(sa.trajectory().len(), 200);
		assert_eq!(sa.evaluations(), 201);
		assert!(sa.accepted() <= 200);
		assert!(sa.best_fitness() >= -32.0);
		let best = sa.best_individual().unwrap();
		assert_eq!(sa.best_fitness(), -best.dot(best));
	}

	#[test]
	fn test_nan_fitness_is_reported() {
		let cfg = SaConfigBuilder::new().max_iter(5).seed(1).build();
		let mut sa = SimulatedAnnealing::new(cfg).unwrap();
		sa.setup(|_: &Array1<f64>| f64::NAN, constant(Array1::zeros(1)));
		assert!(matches!(sa.optimize(), Err(HeuristicError::Numerical(_))));
	}

	#[test]
	fn test_fitness_error_propagates() {
		let cfg = SaConfigBuilder::new().max_iter(5).seed(1).build();
		let mut sa = SimulatedAnnealing::new(cfg).unwrap();
		let failing = Fallible(|_: &Array1<f64>| -> std::result::Result<f64, std::io::Error> {
			Err(std::io::Error::other("simulator crashed"))
		});
		sa.setup(failing, constant(Array1::zeros(1)));
		assert!(matches!(sa.optimize(), Err(HeuristicError::Fitness(_))));
	}

	#[test]
	fn test_invalid_temperature() {
		assert!(SimulatedAnnealing::new(SaConfigBuilder::new().temperature(0.0).build()).is_err());
		assert!(SimulatedAnnealing::new(SaConfigBuilder::new().temperature(f64::NAN).build()).is_err());
	}
}
