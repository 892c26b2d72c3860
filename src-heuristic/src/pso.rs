//! Particle Swarm Optimization (maximizes fitness)
//!
//! Each particle keeps a position, a velocity and its personal best. One
//! iteration moves every particle by its velocity, repairs and scores the new
//! positions, refreshes personal and global bests, then recomputes velocities
//! from three terms: inertia (annealed linearly to 0 over the run), attraction
//! to the personal best and attraction to the global best. The random
//! coefficients of the last two terms are drawn per particle and per dimension.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::argbest::argmax;
use crate::error::{check_dim, ensure, HeuristicError, Result};
use crate::hooks::{Fitness, Repair, Sampler};
use crate::quantile::quantile;
use crate::recorder::Trajectory;
use crate::vector_ops::stack_rows;
use crate::{seeded_rng, should_log};

/// Initial velocities are clipped symmetrically to this quantile of their magnitudes
pub const VELOCITY_CLIP_QUANTILE: f64 = 0.9;

/// Configuration for the particle swarm
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PsoConfig {
	/// Number of particles
	pub group_size: usize,
	/// Inertia weight, [0, 1] is recommended
	pub w_velocity: f64,
	/// Personal best attraction, [0, 1] is recommended
	pub w_pbest: f64,
	/// Global best attraction, [0, 1] is recommended
	pub w_gbest: f64,
	pub max_iter: usize,
	pub seed: Option<u64>,
	/// Log progress every n iterations (0 = never)
	pub log_every: usize,
}

impl Default for PsoConfig {
	fn default() -> Self {
		Self {
			group_size: 20,
			w_velocity: 0.5,
			w_pbest: 0.5,
			w_gbest: 0.5,
			max_iter: 200,
			seed: None,
			log_every: 100,
		}
	}
}

impl PsoConfig {
	pub(crate) fn validate(&self) -> Result<()> {
		ensure(self.group_size > 0, "group_size must be at least 1")?;
		ensure(self.max_iter > 0, "max_iter must be at least 1")?;
		ensure(
			[self.w_velocity, self.w_pbest, self.w_gbest].iter().all(|w| w.is_finite()),
			format!(
				"PSO weights must be finite (w_velocity={}, w_pbest={}, w_gbest={})",
				self.w_velocity, self.w_pbest, self.w_gbest
			),
		)
	}
}

/// Fluent builder for `PsoConfig`
#[derive(Default)]
pub struct PsoConfigBuilder {
	cfg: PsoConfig,
}

impl PsoConfigBuilder {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn group_size(mut self, v: usize) -> Self {
		self.cfg.group_size = v;
		self
	}
	pub fn w_velocity(mut self, v: f64) -> Self {
		self.cfg.w_velocity = v;
		self
	}
	pub fn w_pbest(mut self, v: f64) -> Self {
		self.cfg.w_pbest = v;
		self
	}
	pub fn w_gbest(mut self, v: f64) -> Self {
		self.cfg.w_gbest = v;
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
	pub fn build(self) -> PsoConfig {
		self.cfg
	}
}

struct PsoHooks<'a> {
	fitness: Box<dyn Fitness + 'a>,
	position_init: Box<dyn Sampler + 'a>,
	velocity_init: Box<dyn Sampler + 'a>,
}

/// Particle swarm optimizer
pub struct ParticleSwarm<'a> {
	config: PsoConfig,
	hooks: Option<PsoHooks<'a>>,
	repair: Option<Box<dyn Repair + 'a>>,
	positions: Array2<f64>,
	velocities: Array2<f64>,
	pbest_positions: Array2<f64>,
	pbest_fitness: Array1<f64>,
	n_iter: usize,
	evaluations: usize,
	trajectory: Trajectory,
}

impl<'a> ParticleSwarm<'a> {
	pub fn new(config: PsoConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			config,
			hooks: None,
			repair: None,
			positions: Array2::zeros((0, 0)),
			velocities: Array2::zeros((0, 0)),
			pbest_positions: Array2::zeros((0, 0)),
			pbest_fitness: Array1::zeros(0),
			n_iter: 0,
			evaluations: 0,
			trajectory: Trajectory::new(),
		})
	}

	/// Supply the fitness function and the position/velocity initializers
	pub fn setup(
		&mut self,
		fitness: impl Fitness + 'a,
		position_init: impl Sampler + 'a,
		velocity_init: impl Sampler + 'a,
	) -> &mut Self {
		self.hooks = Some(PsoHooks {
			fitness: Box::new(fitness),
			position_init: Box::new(position_init),
			velocity_init: Box::new(velocity_init),
		});
		self
	}

	/// Repair applied to every position after it moves (identity when unset)
	pub fn repair_with(&mut self, repair: impl Repair + 'a) -> &mut Self {
		self.repair = Some(Box::new(repair));
		self
	}

	/// Run `max_iter` iterations from a freshly initialized swarm
	pub fn optimize(&mut self) -> Result<&Self> {
		let hooks = self.hooks.as_mut().ok_or(HeuristicError::NotConfigured("ParticleSwarm"))?;
		let repair = self.repair.as_deref();
		let cfg = &self.config;
		let n = cfg.group_size;
		let mut rng = seeded_rng(cfg.seed);

		let (mut positions, mut velocities) = init_swarm(hooks, repair, n, &mut rng)?;
		let dim = positions.ncols();
		let mut pbest_positions = positions.clone();
		let mut pbest_fitness = Array1::from_elem(n, f64::NEG_INFINITY);
		let mut best_so_far = f64::NEG_INFINITY;
		self.trajectory.clear();
		self.evaluations = 0;

		for iter in 0..cfg.max_iter {
			positions += &velocities;
			if let Some(repair) = repair {
				repair_rows(repair, &mut positions)?;
			}

			for i in 0..n {
				let fitness = hooks.fitness.evaluate(&positions.row(i).to_owned())?;
				if fitness > pbest_fitness[i] {
					pbest_fitness[i] = fitness;
					pbest_positions.row_mut(i).assign(&positions.row(i));
				}
			}
			self.evaluations += n;

			let (g_idx, g_fitness) = argmax(&pbest_fitness);
			let gbest = pbest_positions.row(g_idx).to_owned();

			let inertia = cfg.w_velocity * (cfg.max_iter - iter) as f64 / cfg.max_iter as f64;
			let r_pbest = Array2::from_shape_fn((n, dim), |_| rng.random::<f64>());
			let r_gbest = Array2::from_shape_fn((n, dim), |_| rng.random::<f64>());
			for i in 0..n {
				for j in 0..dim {
					let x = positions[[i, j]];
					velocities[[i, j]] = inertia * velocities[[i, j]]
						+ cfg.w_pbest * r_pbest[[i, j]] * (pbest_positions[[i, j]] - x)
						+ cfg.w_gbest * r_gbest[[i, j]] * (gbest[j] - x);
				}
			}

			let improved = g_fitness > best_so_far;
			if improved {
				best_so_far = g_fitness;
			}
			self.trajectory.push(iter + 1, best_so_far, improved);
			if should_log(cfg.log_every, iter) {
				log::debug!("PSO iter {:5}  inertia={:.4}  best={:.6e}", iter, inertia, best_so_far);
			}
		}

		log::info!(
			"PSO finished: {} iterations, {} evaluations, best fitness {:.6e}",
			cfg.max_iter,
			self.evaluations,
			best_so_far
		);
		self.positions = positions;
		self.velocities = velocities;
		self.pbest_positions = pbest_positions;
		self.pbest_fitness = pbest_fitness;
		self.n_iter = cfg.max_iter;
		Ok(&*self)
	}

	/// Best personal-best position in the swarm (first one on ties)
	pub fn best_position(&self) -> Option<Array1<f64>> {
		if self.pbest_fitness.is_empty() {
			return None;
		}
		let (idx, _) = argmax(&self.pbest_fitness);
		Some(self.pbest_positions.row(idx).to_owned())
	}

	/// Best fitness found, `-inf` before the first run
	pub fn best_fitness(&self) -> f64 {
		self.pbest_fitness.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
	}

	pub fn positions(&self) -> &Array2<f64> {
		&self.positions
	}

	pub fn velocities(&self) -> &Array2<f64> {
		&self.velocities
	}

	pub fn personal_best_fitness(&self) -> &Array1<f64> {
		&self.pbest_fitness
	}

	pub fn n_iter(&self) -> usize {
		self.n_iter
	}

	pub fn evaluations(&self) -> usize {
		self.evaluations
	}

	pub fn trajectory(&self) -> &Trajectory {
		&self.trajectory
	}

	pub fn config(&self) -> &PsoConfig {
		&self.config
	}
}

/// Sample and repair the positions, then sample velocities and clip them to
/// the configured quantile of their absolute values.
fn init_swarm(
	hooks: &mut PsoHooks<'_>,
	repair: Option<&(dyn Repair + '_)>,
	n: usize,
	rng: &mut StdRng,
) -> Result<(Array2<f64>, Array2<f64>)> {
	let rows: Vec<Array1<f64>> = (0..n).map(|_| hooks.position_init.sample(rng)).collect();
	let dim = rows[0].len();
	let mut positions = stack_rows(&rows, dim)?;
	if let Some(repair) = repair {
		repair_rows(repair, &mut positions)?;
	}

	let rows: Vec<Array1<f64>> = (0..n).map(|_| hooks.velocity_init.sample(rng)).collect();
	let mut velocities = stack_rows(&rows, dim)?;
	let magnitudes: Vec<f64> = velocities.iter().map(|v| v.abs()).collect();
	let v_max = quantile(&magnitudes, VELOCITY_CLIP_QUANTILE).unwrap_or(0.0);
	if !v_max.is_finite() {
		return Err(HeuristicError::Numerical(format!(
			"initial velocity clip bound is not finite ({})",
			v_max
		)));
	}
	velocities.mapv_inplace(|v| v.clamp(-v_max, v_max));
	Ok((positions, velocities))
}

fn repair_rows(repair: &(dyn Repair + '_), positions: &mut Array2<f64>) -> Result<()> {
	let dim = positions.ncols();
	for mut row in positions.rows_mut() {
		let fixed = repair.repair(row.to_owned());
		check_dim(dim, fixed.len())?;
		row.assign(&fixed);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hooks::Clip;
	use crate::init::{uniform, uniform_box};

	fn parabola(x: &Array1<f64>) -> f64 {
		-(x[0] - 3.0).powi(2)
	}

	#[test]
	fn test_optimize_before_setup_fails() {
		let mut pso = ParticleSwarm::new(PsoConfig::default()).unwrap();
		assert!(matches!(pso.optimize(), Err(HeuristicError::NotConfigured("ParticleSwarm"))));
		assert!(pso.best_position().is_none());
	}

	#[test]
	fn test_invalid_config_rejected() {
		let cfg = PsoConfigBuilder::new().group_size(0).build();
		assert!(matches!(ParticleSwarm::new(cfg), Err(HeuristicError::InvalidConfig(_))));
		let cfg = PsoConfigBuilder::new().w_gbest(f64::NAN).build();
		assert!(ParticleSwarm::new(cfg).is_err());
	}

	#[test]
	fn test_initial_velocity_is_clipped() {
		let mut hooks = PsoHooks {
			fitness: Box::new(parabola),
			position_init: Box::new(uniform(3, -10.0, 10.0)),
			velocity_init: Box::new(uniform(3, -5.0, 5.0)),
		};
		let mut rng = seeded_rng(Some(5));
		let (positions, velocities) = init_swarm(&mut hooks, None, 50, &mut rng).unwrap();
		assert_eq!(positions.dim(), (50, 3));

		// replay the same draws to get the raw velocity samples
		let mut rng = seeded_rng(Some(5));
		let mut pos_init = uniform(3, -10.0, 10.0);
		let mut vel_init = uniform(3, -5.0, 5.0);
		for _ in 0..50 {
			pos_init(&mut rng);
		}
		let raw: Vec<f64> = (0..50).flat_map(|_| vel_init(&mut rng).to_vec()).map(f64::abs).collect();
		let bound = quantile(&raw, VELOCITY_CLIP_QUANTILE).unwrap();
		let max_abs = velocities.iter().cloned().map(f64::abs).fold(0.0, f64::max);
		assert!(max_abs <= bound + 1e-12);
		// some entries were above the 90th percentile and got clipped
		assert!((max_abs - bound).abs() < 1e-12);
	}

	#[test]
	fn test_dimension_mismatch_between_initializers() {
		let mut pso = ParticleSwarm::new(PsoConfigBuilder::new().seed(1).build()).unwrap();
		pso.setup(parabola, uniform(1, -1.0, 1.0), uniform(2, -1.0, 1.0));
		assert!(matches!(
			pso.optimize(),
			Err(HeuristicError::DimensionMismatch { expected: 1, found: 2 })
		));
	}

	#[test]
	fn test_repair_keeps_swarm_in_bounds() {
		let bounds = [(0.0, 2.0)];
		let cfg = PsoConfigBuilder::new().group_size(10).max_iter(50).seed(9).build();
		let mut pso = ParticleSwarm::new(cfg).unwrap();
		pso.setup(parabola, uniform_box(&bounds), uniform(1, -5.0, 5.0))
			.repair_with(Clip::new(&bounds));
		pso.optimize().unwrap();
		assert!(pso.positions().iter().all(|&x| (0.0..=2.0).contains(&x)));
		// optimum at 3 lies outside the box, the best feasible point is the edge
		let best = pso.best_position().unwrap();
		assert!((best[0] - 2.0).abs() < 1e-6);
	}
}
