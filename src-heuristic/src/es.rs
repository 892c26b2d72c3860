//! Evolution Strategy with antithetic gradient estimation (minimizes fitness)
//!
//! Each iteration samples `group_size` standard normal directions `d`,
//! estimates
//!
//! `g = mean[(f(x + sigma d) - f(x - sigma d)) d] / (2 sigma)`
//!
//! and proposes `x - learning_rate * g`. The proposal replaces the current
//! generation only when its fitness is strictly lower, so the search is a
//! greedy hill climb guided by the stochastic gradient.

use ndarray::{Array1, Array2};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::error::{ensure, HeuristicError, Result};
use crate::hooks::{Fitness, Sampler};
use crate::recorder::Trajectory;
use crate::{seeded_rng, should_log};

/// Configuration for the gradient-estimating evolution strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EsConfig {
	/// Number of antithetic direction pairs per iteration
	pub group_size: usize,
	/// Perturbation scale
	pub sigma: f64,
	pub max_iter: usize,
	pub learning_rate: f64,
	pub seed: Option<u64>,
	/// Log progress every n iterations (0 = never)
	pub log_every: usize,
}

impl Default for EsConfig {
	fn default() -> Self {
		Self { group_size: 20, sigma: 1e-3, max_iter: 100, learning_rate: 0.1, seed: None, log_every: 10 }
	}
}

impl EsConfig {
	pub(crate) fn validate(&self) -> Result<()> {
		ensure(self.group_size > 0, "group_size must be at least 1")?;
		ensure(self.max_iter > 0, "max_iter must be at least 1")?;
		ensure(self.sigma.is_finite() && self.sigma > 0.0, format!("sigma must be positive, got {}", self.sigma))?;
		ensure(
			self.learning_rate.is_finite(),
			format!("learning_rate must be finite, got {}", self.learning_rate),
		)
	}
}

/// Fluent builder for `EsConfig`
#[derive(Default)]
pub struct EsConfigBuilder {
	cfg: EsConfig,
}

impl EsConfigBuilder {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn group_size(mut self, v: usize) -> Self {
		self.cfg.group_size = v;
		self
	}
	pub fn sigma(mut self, v: f64) -> Self {
		self.cfg.sigma = v;
		self
	}
	pub fn max_iter(mut self, v: usize) -> Self {
		self.cfg.max_iter = v;
		self
	}
	pub fn learning_rate(mut self, v: f64) -> Self {
		self.cfg.learning_rate = v;
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
	pub fn build(self) -> EsConfig {
		self.cfg
	}
}

struct EsHooks<'a> {
	fitness: Box<dyn Fitness + 'a>,
	initialization: Box<dyn Sampler + 'a>,
}

/// Gradient-estimating evolution strategy
pub struct EvolutionStrategy<'a> {
	config: EsConfig,
	hooks: Option<EsHooks<'a>>,
	generation: Option<Array1<f64>>,
	fitness: f64,
	evaluations: usize,
	trajectory: Trajectory,
}

impl<'a> EvolutionStrategy<'a> {
	pub fn new(config: EsConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			config,
			hooks: None,
			generation: None,
			fitness: f64::INFINITY,
			evaluations: 0,
			trajectory: Trajectory::new(),
		})
	}

	/// Supply the fitness function (lower is better) and the initializer
	pub fn setup(&mut self, fitness: impl Fitness + 'a, initialization: impl Sampler + 'a) -> &mut Self {
		self.hooks = Some(EsHooks { fitness: Box::new(fitness), initialization: Box::new(initialization) });
		self
	}

	pub fn optimize(&mut self) -> Result<&Self> {
		let hooks = self.hooks.as_mut().ok_or(HeuristicError::NotConfigured("EvolutionStrategy"))?;
		let cfg = &self.config;
		let mut rng = seeded_rng(cfg.seed);

		let mut generation = hooks.initialization.sample(&mut rng);
		let dim = generation.len();
		let mut fitness = hooks.fitness.evaluate(&generation)?;
		self.evaluations = 1;
		self.trajectory.clear();

		for iter in 0..cfg.max_iter {
			let directions: Array2<f64> =
				Array2::from_shape_fn((cfg.group_size, dim), |_| StandardNormal.sample(&mut rng));

			let mut gradient = Array1::<f64>::zeros(dim);
			for d in directions.rows() {
				let step = &d * cfg.sigma;
				let f_plus = hooks.fitness.evaluate(&(&generation + &step))?;
				let f_minus = hooks.fitness.evaluate(&(&generation - &step))?;
				gradient.scaled_add(f_plus - f_minus, &d);
			}
			gradient /= 2.0 * cfg.sigma * cfg.group_size as f64;
			self.evaluations += 2 * cfg.group_size;

			let proposal = &generation - &(gradient * cfg.learning_rate);
			let proposal_fitness = hooks.fitness.evaluate(&proposal)?;
			self.evaluations += 1;

			let improved = proposal_fitness < fitness;
			if improved {
				generation = proposal;
				fitness = proposal_fitness;
			}
			self.trajectory.push(iter + 1, fitness, improved);
			if should_log(cfg.log_every, iter) {
				log::debug!("ES iter {:5}  fitness={:.6e}", iter, fitness);
			}
		}

		log::info!(
			"ES finished: {} iterations, {} evaluations, fitness {:.6e}",
			cfg.max_iter,
			self.evaluations,
			fitness
		);
		self.generation = Some(generation);
		self.fitness = fitness;
		Ok(&*self)
	}

	/// Current (and best) generation, `None` before the first run
	pub fn generation(&self) -> Option<&Array1<f64>> {
		self.generation.as_ref()
	}

	/// Fitness of the current generation, `inf` before the first run
	pub fn fitness(&self) -> f64 {
		self.fitness
	}

	pub fn evaluations(&self) -> usize {
		self.evaluations
	}

	pub fn trajectory(&self) -> &Trajectory {
		&self.trajectory
	}

	pub fn config(&self) -> &EsConfig {
		&self.config
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::init::constant;

	fn shifted_sphere(x: &Array1<f64>) -> f64 {
		x.iter().enumerate().map(|(i, &v)| (v - i as f64).powi(2)).sum()
	}

	#[test]
	fn test_es_descends_on_sphere() {
		let cfg = EsConfigBuilder::new().group_size(20).sigma(1e-3).max_iter(200).learning_rate(0.1).seed(2).build();
		let mut es = EvolutionStrategy::new(cfg).unwrap();
		es.setup(shifted_sphere, constant(Array1::from(vec![5.0, 5.0, 5.0])));
		es.optimize().unwrap();
		let start = shifted_sphere(&Array1::from(vec![5.0, 5.0, 5.0]));
		assert!(es.fitness() < start * 1e-3, "fitness {} did not drop", es.fitness());
		let x = es.generation().unwrap();
		for (i, &v) in x.iter().enumerate() {
			assert!((v - i as f64).abs() < 0.1, "x[{}] = {}", i, v);
		}
	}

	#[test]
	fn test_es_never_accepts_worse() {
		let cfg = EsConfigBuilder::new().learning_rate(50.0).max_iter(30).seed(8).build();
		let mut es = EvolutionStrategy::new(cfg).unwrap();
		es.setup(shifted_sphere, constant(Array1::from(vec![0.5, 0.5])));
		es.optimize().unwrap();
		let fitness = es.trajectory().best_fitness();
		assert!(fitness.windows(2).all(|w| w[1] <= w[0]));
		assert_eq!(es.evaluations(), 1 + 30 * (2 * 20 + 1));
	}

	#[test]
	fn test_es_requires_setup() {
		let mut es = EvolutionStrategy::new(EsConfig::default()).unwrap();
		assert!(matches!(es.optimize(), Err(HeuristicError::NotConfigured(_))));
		let bad = EsConfigBuilder::new().sigma(0.0).build();
		assert!(EvolutionStrategy::new(bad).is_err());
	}
}
