//! Gaussian evolution strategy (minimizes fitness)
//!
//! A diagonal Gaussian search distribution `N(mean, diag(variance))` is
//! sampled `mu` times per iteration, and the `la` lowest-fitness samples
//! become the new mean and (population, ddof = 0) variance.

use ndarray::{Array1, Array2, Axis};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::argbest::smallest_k;
use crate::error::{check_dim, ensure, HeuristicError, Result};
use crate::hooks::Fitness;
use crate::recorder::Trajectory;
use crate::{seeded_rng, should_log};

/// Configuration for the Gaussian evolution strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GaussianEsConfig {
	/// Population size sampled per iteration
	pub mu: usize,
	/// Number of elites kept to refit the distribution, `1 <= la < mu`
	pub la: usize,
	pub max_iter: usize,
	pub seed: Option<u64>,
	/// Log progress every n iterations (0 = never)
	pub log_every: usize,
}

impl Default for GaussianEsConfig {
	fn default() -> Self {
		Self { mu: 50, la: 10, max_iter: 100, seed: None, log_every: 10 }
	}
}

impl GaussianEsConfig {
	pub(crate) fn validate(&self) -> Result<()> {
		ensure(self.la >= 1, "la must be at least 1")?;
		ensure(self.la < self.mu, format!("la ({}) must be smaller than mu ({})", self.la, self.mu))?;
		ensure(self.max_iter > 0, "max_iter must be at least 1")
	}
}

/// Fluent builder for `GaussianEsConfig`
#[derive(Default)]
pub struct GaussianEsConfigBuilder {
	cfg: GaussianEsConfig,
}

impl GaussianEsConfigBuilder {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn mu(mut self, v: usize) -> Self {
		self.cfg.mu = v;
		self
	}
	pub fn la(mut self, v: usize) -> Self {
		self.cfg.la = v;
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
	pub fn build(self) -> GaussianEsConfig {
		self.cfg
	}
}

/// Estimation-of-distribution strategy with a diagonal Gaussian model
pub struct GaussianEs<'a> {
	config: GaussianEsConfig,
	fitness: Option<Box<dyn Fitness + 'a>>,
	mean_init: Array1<f64>,
	variance_init: Array1<f64>,
	mean: Array1<f64>,
	variance: Array1<f64>,
	best_sample: Option<Array1<f64>>,
	best_fitness: f64,
	evaluations: usize,
	trajectory: Trajectory,
}

impl<'a> GaussianEs<'a> {
	pub fn new(config: GaussianEsConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			config,
			fitness: None,
			mean_init: Array1::zeros(0),
			variance_init: Array1::zeros(0),
			mean: Array1::zeros(0),
			variance: Array1::zeros(0),
			best_sample: None,
			best_fitness: f64::INFINITY,
			evaluations: 0,
			trajectory: Trajectory::new(),
		})
	}

	/// Supply the fitness function (lower is better) and the initial distribution
	pub fn setup(
		&mut self,
		fitness: impl Fitness + 'a,
		mean_init: Array1<f64>,
		variance_init: Array1<f64>,
	) -> Result<&mut Self> {
		check_dim(mean_init.len(), variance_init.len())?;
		ensure(
			variance_init.iter().all(|&v| v.is_finite() && v >= 0.0),
			"variance must be finite and non-negative",
		)?;
		self.fitness = Some(Box::new(fitness));
		self.mean = mean_init.clone();
		self.variance = variance_init.clone();
		self.mean_init = mean_init;
		self.variance_init = variance_init;
		Ok(self)
	}

	pub fn optimize(&mut self) -> Result<&Self> {
		let fitness = self.fitness.as_ref().ok_or(HeuristicError::NotConfigured("GaussianEs"))?;
		let cfg = &self.config;
		let mut rng = seeded_rng(cfg.seed);
		self.mean = self.mean_init.clone();
		self.variance = self.variance_init.clone();
		self.best_sample = None;
		self.best_fitness = f64::INFINITY;
		let dim = self.mean.len();
		self.evaluations = 0;
		self.trajectory.clear();

		for iter in 0..cfg.max_iter {
			let std_dev = self.variance.mapv(f64::sqrt);
			let z: Array2<f64> = Array2::from_shape_fn((cfg.mu, dim), |_| StandardNormal.sample(&mut rng));
			let samples = &z * &std_dev + &self.mean;

			let mut scores = Array1::<f64>::zeros(cfg.mu);
			for (i, x) in samples.rows().into_iter().enumerate() {
				scores[i] = fitness.evaluate(&x.to_owned())?;
			}
			self.evaluations += cfg.mu;

			let elites = smallest_k(&scores, cfg.la);
			let improved = scores[elites[0]] < self.best_fitness;
			if improved {
				self.best_fitness = scores[elites[0]];
				self.best_sample = Some(samples.row(elites[0]).to_owned());
			}

			let elite_samples = samples.select(Axis(0), &elites);
			self.mean = elite_samples
				.mean_axis(Axis(0))
				.ok_or_else(|| HeuristicError::Numerical("empty elite set".into()))?;
			self.variance = elite_samples.var_axis(Axis(0), 0.0);

			self.trajectory.push(iter + 1, self.best_fitness, improved);
			if should_log(cfg.log_every, iter) {
				log::debug!(
					"GaussianES iter {:5}  best={:.6e}  mean variance={:.3e}",
					iter,
					self.best_fitness,
					self.variance.mean().unwrap_or(0.0)
				);
			}
		}

		log::info!(
			"GaussianES finished: {} iterations, {} evaluations, best {:.6e}",
			cfg.max_iter,
			self.evaluations,
			self.best_fitness
		);
		Ok(&*self)
	}

	/// Current distribution mean
	pub fn mean(&self) -> &Array1<f64> {
		&self.mean
	}

	/// Current per-component variance
	pub fn variance(&self) -> &Array1<f64> {
		&self.variance
	}

	/// Lowest-fitness sample seen so far
	pub fn best_sample(&self) -> Option<&Array1<f64>> {
		self.best_sample.as_ref()
	}

	pub fn best_fitness(&self) -> f64 {
		self.best_fitness
	}

	pub fn evaluations(&self) -> usize {
		self.evaluations
	}

	pub fn trajectory(&self) -> &Trajectory {
		&self.trajectory
	}

	pub fn config(&self) -> &GaussianEsConfig {
		&self.config
	}
}
