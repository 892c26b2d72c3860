//! Artificial Fish Swarm (maximizes fitness)
//!
//! Every fish looks at the neighbours closer than `visual` (root-mean-square
//! distance) and tries three behaviours:
//!
//! - prey: up to `retry` random neighbours, move towards the first fitter one
//! - swarm: move towards the neighbourhood centroid if its mean fitness is at
//!   least its own
//! - follow: same test on the neighbourhood of the fittest visible neighbour
//!
//! The fittest proposed position wins. With no proposal the fish swims in a
//! random direction. Steps have length `speed * (1 - iter / max_iter)`, with
//! `speed` drawn per fish and per iteration. All fish of one iteration read
//! the same snapshot of the previous swarm.

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{check_dim, ensure, HeuristicError, Result};
use crate::hooks::{Fitness, Sampler, ScalarSampler};
use crate::recorder::Trajectory;
use crate::vector_ops::{normalize, rms_distance};
use crate::{seeded_rng, should_log};

/// Configuration for the fish swarm
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AfsConfig {
	/// Neighbourhood radius in root-mean-square units
	pub visual: f64,
	/// Prey attempts per fish and iteration
	pub retry: usize,
	pub swarm_size: usize,
	pub max_iter: usize,
	pub seed: Option<u64>,
	/// Log progress every n iterations (0 = never)
	pub log_every: usize,
}

impl Default for AfsConfig {
	fn default() -> Self {
		Self { visual: 1.0, retry: 10, swarm_size: 50, max_iter: 100, seed: None, log_every: 10 }
	}
}

impl AfsConfig {
	pub(crate) fn validate(&self) -> Result<()> {
		ensure(self.swarm_size > 0, "swarm_size must be at least 1")?;
		ensure(self.max_iter > 0, "max_iter must be at least 1")?;
		ensure(self.visual.is_finite() && self.visual > 0.0, format!("visual must be positive, got {}", self.visual))
	}
}

/// Fluent builder for `AfsConfig`
#[derive(Default)]
pub struct AfsConfigBuilder {
	cfg: AfsConfig,
}

impl AfsConfigBuilder {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn visual(mut self, v: f64) -> Self {
		self.cfg.visual = v;
		self
	}
	pub fn retry(mut self, v: usize) -> Self {
		self.cfg.retry = v;
		self
	}
	pub fn swarm_size(mut self, v: usize) -> Self {
		self.cfg.swarm_size = v;
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
	pub fn build(self) -> AfsConfig {
		self.cfg
	}
}

/// One fish: a position and its fitness
#[derive(Debug, Clone, PartialEq)]
pub struct Fish {
	position: Array1<f64>,
	fitness: f64,
}

impl Fish {
	pub fn position(&self) -> &Array1<f64> {
		&self.position
	}

	pub fn fitness(&self) -> f64 {
		self.fitness
	}

	/// Root-mean-square distance between two fish
	pub fn distance(&self, other: &Fish) -> f64 {
		rms_distance(self.position.view(), other.position.view())
	}
}

struct AfsHooks<'a> {
	fitness: Box<dyn Fitness + 'a>,
	position_init: Box<dyn Sampler + 'a>,
	direction_init: Box<dyn Sampler + 'a>,
	speed_init: Box<dyn ScalarSampler + 'a>,
}

/// Artificial fish swarm optimizer
pub struct ArtificialFishSwarm<'a> {
	config: AfsConfig,
	hooks: Option<AfsHooks<'a>>,
	swarm: Vec<Fish>,
	best_fish: Option<Fish>,
	evaluations: usize,
	trajectory: Trajectory,
}

impl<'a> ArtificialFishSwarm<'a> {
	pub fn new(config: AfsConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self { config, hooks: None, swarm: Vec::new(), best_fish: None, evaluations: 0, trajectory: Trajectory::new() })
	}

	/// Supply the fitness function, position and direction initializers and the speed initializer
	pub fn setup(
		&mut self,
		fitness: impl Fitness + 'a,
		position_init: impl Sampler + 'a,
		direction_init: impl Sampler + 'a,
		speed_init: impl ScalarSampler + 'a,
	) -> &mut Self {
		self.hooks = Some(AfsHooks {
			fitness: Box::new(fitness),
			position_init: Box::new(position_init),
			direction_init: Box::new(direction_init),
			speed_init: Box::new(speed_init),
		});
		self
	}

	pub fn optimize(&mut self) -> Result<&Self> {
		let hooks = self.hooks.as_mut().ok_or(HeuristicError::NotConfigured("ArtificialFishSwarm"))?;
		let cfg = &self.config;
		let mut rng = seeded_rng(cfg.seed);
		self.trajectory.clear();
		self.best_fish = None;

		let mut current: Vec<Fish> = Vec::with_capacity(cfg.swarm_size);
		for _ in 0..cfg.swarm_size {
			let position = hooks.position_init.sample(&mut rng);
			if let Some(first) = current.first() {
				check_dim(first.position.len(), position.len())?;
			}
			let fitness = hooks.fitness.evaluate(&position)?;
			current.push(Fish { position, fitness });
		}
		self.evaluations = cfg.swarm_size;
		let mut best = fittest(&current).clone();

		let mut next: Vec<Fish> = Vec::with_capacity(cfg.swarm_size);
		for iter in 0..cfg.max_iter {
			let decay = 1.0 - iter as f64 / cfg.max_iter as f64;
			next.clear();
			for i in 0..current.len() {
				let speed = hooks.speed_init.sample(&mut rng) * decay;
				let fish = step(&current, i, speed, cfg, hooks, &mut rng, &mut self.evaluations)?;
				next.push(fish);
			}
			std::mem::swap(&mut current, &mut next);

			let candidate = fittest(&current);
			let improved = candidate.fitness > best.fitness;
			if improved {
				best = candidate.clone();
			}
			self.trajectory.push(iter + 1, best.fitness, improved);
			if should_log(cfg.log_every, iter) {
				log::debug!("AFS iter {:5}  speed factor={:.4}  best={:.6e}", iter, decay, best.fitness);
			}
		}

		log::info!(
			"AFS finished: {} iterations, {} evaluations, best fitness {:.6e}",
			cfg.max_iter,
			self.evaluations,
			best.fitness
		);
		self.swarm = current;
		self.best_fish = Some(best);
		Ok(&*self)
	}

	/// Fittest fish seen during the run, including the initial swarm
	pub fn best_fish(&self) -> Option<&Fish> {
		self.best_fish.as_ref()
	}

	/// Swarm after the last iteration
	pub fn swarm(&self) -> &[Fish] {
		&self.swarm
	}

	pub fn evaluations(&self) -> usize {
		self.evaluations
	}

	pub fn trajectory(&self) -> &Trajectory {
		&self.trajectory
	}

	pub fn config(&self) -> &AfsConfig {
		&self.config
	}
}

/// First fish with the highest fitness; `swarm` is never empty here.
fn fittest(swarm: &[Fish]) -> &Fish {
	let mut best = &swarm[0];
	for fish in &swarm[1..] {
		if fish.fitness > best.fitness {
			best = fish;
		}
	}
	best
}

/// Indices of the fish strictly inside the visual radius of `center`, `center` itself excluded.
fn visible(swarm: &[Fish], center: &Fish, visual: f64) -> Vec<usize> {
	swarm
		.iter()
		.enumerate()
		.filter(|(_, other)| {
			let d = center.distance(other);
			d > 0.0 && d < visual
		})
		.map(|(j, _)| j)
		.collect()
}

fn centroid(swarm: &[Fish], idx: &[usize]) -> Array1<f64> {
	let mut sum = Array1::zeros(swarm[idx[0]].position.len());
	for &j in idx {
		sum += &swarm[j].position;
	}
	sum / idx.len() as f64
}

fn mean_fitness(swarm: &[Fish], idx: &[usize]) -> f64 {
	idx.iter().map(|&j| swarm[j].fitness).sum::<f64>() / idx.len() as f64
}

/// Step `speed` along the unit vector from `from` towards `target`.
pub(crate) fn move_toward(from: &Array1<f64>, target: &Array1<f64>, speed: f64) -> Result<Array1<f64>> {
	let direction = target - from;
	if direction.iter().all(|&d| d == 0.0) {
		return Ok(from.clone());
	}
	Ok(from + &(normalize(&direction)? * speed))
}

fn prey(
	swarm: &[Fish],
	me: &Fish,
	seen: &[usize],
	speed: f64,
	retry: usize,
	rng: &mut StdRng,
) -> Result<Option<Array1<f64>>> {
	if seen.is_empty() {
		return Ok(None);
	}
	for _ in 0..retry {
		let other = &swarm[seen[rng.random_range(0..seen.len())]];
		if other.fitness > me.fitness {
			return move_toward(&me.position, &other.position, speed).map(Some);
		}
	}
	Ok(None)
}

fn gather(swarm: &[Fish], me: &Fish, seen: &[usize], speed: f64) -> Result<Option<Array1<f64>>> {
	if seen.is_empty() || mean_fitness(swarm, seen) < me.fitness {
		return Ok(None);
	}
	move_toward(&me.position, &centroid(swarm, seen), speed).map(Some)
}

fn follow(swarm: &[Fish], me: &Fish, seen: &[usize], speed: f64, visual: f64) -> Result<Option<Array1<f64>>> {
	if seen.is_empty() {
		return Ok(None);
	}
	let mut leader = seen[0];
	for &j in &seen[1..] {
		if swarm[j].fitness > swarm[leader].fitness {
			leader = j;
		}
	}
	let leader_seen = visible(swarm, &swarm[leader], visual);
	gather(swarm, me, &leader_seen, speed)
}

/// Next state of fish `i`, computed from the previous swarm only
fn step(
	swarm: &[Fish],
	i: usize,
	speed: f64,
	cfg: &AfsConfig,
	hooks: &mut AfsHooks<'_>,
	rng: &mut StdRng,
	evaluations: &mut usize,
) -> Result<Fish> {
	let me = &swarm[i];
	let seen = visible(swarm, me, cfg.visual);
	let proposals = [
		prey(swarm, me, &seen, speed, cfg.retry, rng)?,
		gather(swarm, me, &seen, speed)?,
		follow(swarm, me, &seen, speed, cfg.visual)?,
	];

	let mut chosen: Option<Fish> = None;
	for position in proposals.into_iter().flatten() {
		let fitness = hooks.fitness.evaluate(&position)?;
		*evaluations += 1;
		if chosen.as_ref().is_none_or(|c| fitness > c.fitness) {
			chosen = Some(Fish { position, fitness });
		}
	}
	if let Some(fish) = chosen {
		return Ok(fish);
	}

	let direction = hooks.direction_init.sample(rng);
	check_dim(me.position.len(), direction.len())?;
	let position = &me.position + &(normalize(&direction)? * speed);
	let fitness = hooks.fitness.evaluate(&position)?;
	*evaluations += 1;
	Ok(Fish { position, fitness })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::init::{constant, constant_scalar, standard_normal, uniform};

	fn bowl(x: &Array1<f64>) -> f64 {
		-x.iter().map(|v| (v - 1.0).powi(2)).sum::<f64>()
	}

	#[test]
	fn test_move_toward() {
		let from = Array1::from(vec![0.0, 0.0]);
		let same = move_toward(&from, &from.clone(), 1.0).unwrap();
		assert_eq!(same, from);
		let moved = move_toward(&from, &Array1::from(vec![3.0, 4.0]), 0.5).unwrap();
		assert!((moved[0] - 0.3).abs() < 1e-15 && (moved[1] - 0.4).abs() < 1e-15);
	}

	#[test]
	fn test_visible_excludes_self_and_far_fish() {
		let swarm: Vec<Fish> = [0.0, 0.5, 0.0, 3.0]
			.iter()
			.map(|&p| Fish { position: Array1::from(vec![p]), fitness: 0.0 })
			.collect();
		// fish 2 shares the position of fish 0 and is not visible either
		assert_eq!(visible(&swarm, &swarm[0], 1.0), vec![1]);
	}

	fn school(fish: &[(f64, f64)]) -> Vec<Fish> {
		fish.iter().map(|&(p, fitness)| Fish { position: Array1::from(vec![p]), fitness }).collect()
	}

	#[test]
	fn test_prey_needs_a_fitter_neighbour() {
		let mut rng = seeded_rng(Some(1));
		let swarm = school(&[(0.0, 5.0), (0.5, 1.0)]);
		assert!(prey(&swarm, &swarm[0], &[1], 0.3, 3, &mut rng).unwrap().is_none());

		let swarm = school(&[(0.0, 5.0), (1.0, 10.0)]);
		let moved = prey(&swarm, &swarm[0], &[1], 0.3, 3, &mut rng).unwrap().unwrap();
		assert!((moved[0] - 0.3).abs() < 1e-15);
	}

	#[test]
	fn test_gather_needs_a_fit_enough_neighbourhood() {
		let swarm = school(&[(0.0, 5.0), (0.5, 1.0), (-0.5, 3.0)]);
		assert!(gather(&swarm, &swarm[0], &[1, 2], 0.2).unwrap().is_none());

		let swarm = school(&[(0.0, 1.0), (0.5, 1.0), (0.9, 3.0)]);
		let moved = gather(&swarm, &swarm[0], &[1, 2], 0.2).unwrap().unwrap();
		assert!((moved[0] - 0.2).abs() < 1e-15);
	}

	#[test]
	fn test_follow_uses_the_leader_neighbourhood() {
		// own neighbourhood {A, L} has centroid 0.2, the leader L sees {me, B} around -0.65
		let swarm = school(&[(0.0, 0.0), (0.9, 1.0), (-0.5, 10.0), (-1.3, 9.0)]);
		let seen = visible(&swarm, &swarm[0], 1.0);
		assert_eq!(seen, vec![1, 2]);
		let moved = follow(&swarm, &swarm[0], &seen, 0.5, 1.0).unwrap().unwrap();
		assert!((moved[0] + 0.5).abs() < 1e-12, "moved to {}", moved[0]);

		let gathered = gather(&swarm, &swarm[0], &seen, 0.5).unwrap().unwrap();
		assert!((gathered[0] - 0.5).abs() < 1e-12);
	}

	#[test]
	fn test_fish_read_the_previous_swarm() {
		let cfg = AfsConfigBuilder::new().swarm_size(2).max_iter(1).visual(1.2).seed(4).build();
		let mut afs = ArtificialFishSwarm::new(cfg).unwrap();
		let mut next_position = 0.0;
		let positions = move |_: &mut StdRng| {
			let p = Array1::from(vec![next_position]);
			next_position += 1.0;
			p
		};
		afs.setup(|_: &Array1<f64>| 0.0, positions, standard_normal(1), constant_scalar(1.5));
		afs.optimize().unwrap();

		// each fish overshoots the other's old position; reading the moved
		// fish 0 at 1.5 would have pushed fish 1 to 2.5 instead
		let swarm = afs.swarm();
		assert!((swarm[0].position()[0] - 1.5).abs() < 1e-12);
		assert!((swarm[1].position()[0] + 0.5).abs() < 1e-12);
		// two initial evaluations, then gather and follow for each fish
		assert_eq!(afs.evaluations(), 2 + 2 * 2);
	}

	#[test]
	fn test_afs_improves_on_bowl() {
		let cfg = AfsConfigBuilder::new().visual(2.0).retry(5).swarm_size(40).max_iter(100).seed(21).build();
		let mut afs = ArtificialFishSwarm::new(cfg).unwrap();
		afs.setup(bowl, uniform(2, -1.0, 3.0), standard_normal(2), constant_scalar(0.5));
		afs.optimize().unwrap();
		let best = afs.best_fish().unwrap();
		assert!(best.fitness() > -0.1, "best fitness {}", best.fitness());
		assert_eq!(best.fitness(), bowl(best.position()));
		assert_eq!(afs.swarm().len(), 40);
		let history = afs.trajectory().best_fitness();
		assert!(history.windows(2).all(|w| w[1] >= w[0]));
	}

	#[test]
	fn test_lonely_fish_with_zero_direction_fails() {
		let cfg = AfsConfigBuilder::new().swarm_size(1).max_iter(3).seed(2).build();
		let mut afs = ArtificialFishSwarm::new(cfg).unwrap();
		afs.setup(bowl, uniform(2, -1.0, 1.0), constant(Array1::zeros(2)), constant_scalar(1.0));
		assert!(matches!(afs.optimize(), Err(HeuristicError::ZeroDirection)));
	}

	#[test]
	fn test_lonely_fish_swims_at_decaying_speed() {
		let cfg = AfsConfigBuilder::new().swarm_size(1).max_iter(4).seed(2).build();
		let mut afs = ArtificialFishSwarm::new(cfg).unwrap();
		afs.setup(
			bowl,
			constant(Array1::from(vec![0.0])),
			constant(Array1::from(vec![2.0])),
			constant_scalar(1.0),
		);
		afs.optimize().unwrap();
		// 1 + 0.75 + 0.5 + 0.25
		assert!((afs.swarm()[0].position()[0] - 2.5).abs() < 1e-12);
		assert_eq!(afs.evaluations(), 1 + 4);
	}

	#[test]
	fn test_afs_requires_setup_and_valid_visual() {
		let mut afs = ArtificialFishSwarm::new(AfsConfig::default()).unwrap();
		assert!(matches!(afs.optimize(), Err(HeuristicError::NotConfigured(_))));
		assert!(ArtificialFishSwarm::new(AfsConfigBuilder::new().visual(0.0).build()).is_err());
	}
}
