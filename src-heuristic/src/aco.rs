//! Ant Colony Optimization over a weighted graph (minimizes tour distance)
//!
//! Every ant builds a full permutation of the nodes from a fixed start node:
//! it samples the next node from a softmax over the pheromone row of its
//! current node, with already visited nodes masked out. After each iteration
//! the colony pheromone decays and every ant deposits `1 / distance` on the
//! edges of its path.

use ndarray::{Array1, Array2};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::{ensure, HeuristicError, Result};
use crate::recorder::Trajectory;
use crate::softmax::masked_softmax;
use crate::{seeded_rng, should_log};

/// Tours shorter than this deposit as if they had this length
pub const MIN_TOUR_DISTANCE: f64 = 1e-12;

/// Configuration for the ant colony
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcoConfig {
	/// Number of ants
	pub group_size: usize,
	pub max_iter: usize,
	/// Fraction of the pheromone kept from one iteration to the next, in [0, 1]
	pub decay: f64,
	pub seed: Option<u64>,
	/// Log progress every n iterations (0 = never)
	pub log_every: usize,
}

impl Default for AcoConfig {
	fn default() -> Self {
		Self { group_size: 10, max_iter: 50, decay: 0.9, seed: None, log_every: 10 }
	}
}

impl AcoConfig {
	pub(crate) fn validate(&self) -> Result<()> {
		ensure(self.group_size > 0, "group_size must be at least 1")?;
		ensure(self.max_iter > 0, "max_iter must be at least 1")?;
		ensure((0.0..=1.0).contains(&self.decay), format!("decay must be in [0, 1], got {}", self.decay))
	}
}

/// Fluent builder for `AcoConfig`
#[derive(Default)]
pub struct AcoConfigBuilder {
	cfg: AcoConfig,
}

impl AcoConfigBuilder {
	pub fn new() -> Self {
		Self::default()
	}
	pub fn group_size(mut self, v: usize) -> Self {
		self.cfg.group_size = v;
		self
	}
	pub fn max_iter(mut self, v: usize) -> Self {
		self.cfg.max_iter = v;
		self
	}
	pub fn decay(mut self, v: f64) -> Self {
		self.cfg.decay = v;
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
	pub fn build(self) -> AcoConfig {
		self.cfg
	}
}

/// Build a dense cost matrix from `(from, to, cost)` edges; absent edges cost 0.
pub fn graph_from_edges(n_nodes: usize, edges: &[(usize, usize, f64)]) -> Result<Array2<f64>> {
	let mut graph = Array2::zeros((n_nodes, n_nodes));
	for &(from, to, cost) in edges {
		ensure(
			from < n_nodes && to < n_nodes,
			format!("edge ({}, {}) is outside a graph of {} nodes", from, to, n_nodes),
		)?;
		graph[[from, to]] = cost;
	}
	Ok(graph)
}

/// A single ant walking one tour per iteration
#[derive(Debug, Clone)]
pub struct Ant {
	mask: Array1<f64>,
	current: usize,
	path: Vec<usize>,
	distance: f64,
}

impl Ant {
	pub fn new(n_nodes: usize) -> Self {
		Self { mask: Array1::zeros(n_nodes), current: 0, path: Vec::with_capacity(n_nodes), distance: 0.0 }
	}

	fn reset(&mut self, start: usize) {
		self.mask.fill(0.0);
		self.mask[start] = f64::NEG_INFINITY;
		self.current = start;
		self.path.clear();
		self.path.push(start);
		self.distance = 0.0;
	}

	fn choose_next(&self, pheromone: &Array2<f64>, rng: &mut StdRng) -> Result<usize> {
		let prob = masked_softmax(pheromone.row(self.current), self.mask.view());
		let dist = WeightedIndex::new(prob.iter().copied()).map_err(|e| {
			HeuristicError::Numerical(format!("cannot sample from pheromone row {}: {}", self.current, e))
		})?;
		Ok(dist.sample(rng))
	}

	fn advance(&mut self, graph: &Array2<f64>, next: usize) {
		self.mask[next] = f64::NEG_INFINITY;
		self.distance += graph[[self.current, next]];
		self.path.push(next);
		self.current = next;
	}

	/// Walk exactly `n_nodes - 1` moves from `start`, visiting every node once
	pub fn search_path(
		&mut self,
		graph: &Array2<f64>,
		pheromone: &Array2<f64>,
		start: usize,
		rng: &mut StdRng,
	) -> Result<&[usize]> {
		self.reset(start);
		for _ in 1..graph.nrows() {
			let next = self.choose_next(pheromone, rng)?;
			self.advance(graph, next);
		}
		Ok(&self.path)
	}

	pub fn path(&self) -> &[usize] {
		&self.path
	}

	pub fn distance(&self) -> f64 {
		self.distance
	}
}

/// Ant colony with an exponentially decaying pheromone matrix
pub struct AntColony {
	config: AcoConfig,
	graph: Array2<f64>,
	pheromone: Array2<f64>,
	ants: Vec<Ant>,
	best_path: Option<Vec<usize>>,
	best_distance: f64,
	trajectory: Trajectory,
}

impl AntColony {
	/// `graph[[i, j]]` is the non-negative cost of travelling from `i` to `j`
	pub fn new(graph: Array2<f64>, config: AcoConfig) -> Result<Self> {
		config.validate()?;
		let n = graph.nrows();
		ensure(n > 0 && graph.ncols() == n, format!("graph must be square and non-empty, got {:?}", graph.dim()))?;
		ensure(
			graph.iter().all(|&c| c.is_finite() && c >= 0.0),
			"graph costs must be finite and non-negative",
		)?;
		let ants = (0..config.group_size).map(|_| Ant::new(n)).collect();
		Ok(Self {
			config,
			pheromone: Array2::zeros((n, n)),
			graph,
			ants,
			best_path: None,
			best_distance: f64::INFINITY,
			trajectory: Trajectory::new(),
		})
	}

	/// Run the colony for `max_iter` iterations with every tour starting at `start`
	pub fn optimize(&mut self, start: usize) -> Result<&Self> {
		let n = self.graph.nrows();
		ensure(start < n, format!("start node {} is outside a graph of {} nodes", start, n))?;
		let mut rng = seeded_rng(self.config.seed);
		self.trajectory.clear();
		self.best_path = None;
		self.best_distance = f64::INFINITY;

		for iter in 0..self.config.max_iter {
			let mut deposit = Array2::<f64>::zeros((n, n));
			let mut improved = false;
			for ant in self.ants.iter_mut() {
				ant.search_path(&self.graph, &self.pheromone, start, &mut rng)?;
				let amount = 1.0 / ant.distance().max(MIN_TOUR_DISTANCE);
				for edge in ant.path().windows(2) {
					deposit[[edge[0], edge[1]]] += amount;
				}
				if ant.distance() < self.best_distance {
					self.best_distance = ant.distance();
					self.best_path = Some(ant.path().to_vec());
					improved = true;
				}
			}
			self.pheromone = &self.pheromone * self.config.decay + deposit;
			self.trajectory.push(iter + 1, self.best_distance, improved);
			if should_log(self.config.log_every, iter) {
				log::debug!("ACO iter {:5}  best distance={:.6e}", iter, self.best_distance);
			}
		}

		log::info!(
			"ACO finished: {} iterations, best distance {:.6e}, path {:?}",
			self.config.max_iter,
			self.best_distance,
			self.best_path
		);
		Ok(&*self)
	}

	pub fn best_path(&self) -> Option<&[usize]> {
		self.best_path.as_deref()
	}

	/// Shortest tour distance found, `inf` before the first run
	pub fn best_distance(&self) -> f64 {
		self.best_distance
	}

	pub fn pheromone(&self) -> &Array2<f64> {
		&self.pheromone
	}

	pub fn ants(&self) -> &[Ant] {
		&self.ants
	}

	pub fn graph(&self) -> &Array2<f64> {
		&self.graph
	}

	pub fn trajectory(&self) -> &Trajectory {
		&self.trajectory
	}

	pub fn config(&self) -> &AcoConfig {
		&self.config
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ant_builds_permutation() {
		let n = 6;
		let graph = Array2::from_shape_fn((n, n), |(i, j)| if i == j { 0.0 } else { (i + j) as f64 });
		// strongly biased pheromone must not pull an ant back to a visited node
		let pheromone = Array2::from_shape_fn((n, n), |(_, j)| if j == 2 { 1e6 } else { 0.0 });
		let mut ant = Ant::new(n);
		let mut rng = seeded_rng(Some(17));
		for start in 0..n {
			let path = ant.search_path(&graph, &pheromone, start, &mut rng).unwrap().to_vec();
			let mut sorted = path.clone();
			sorted.sort_unstable();
			assert_eq!(path.len(), n);
			assert_eq!(path[0], start);
			assert_eq!(sorted, (0..n).collect::<Vec<_>>());
			let expected: f64 = path.windows(2).map(|e| graph[[e[0], e[1]]]).sum();
			assert_eq!(ant.distance(), expected);
		}
	}

	#[test]
	fn test_pheromone_decays_and_reinforces() {
		let graph = graph_from_edges(2, &[(0, 1, 4.0), (1, 0, 4.0)]).unwrap();
		let cfg = AcoConfigBuilder::new().group_size(3).max_iter(2).decay(0.5).seed(1).build();
		let mut colony = AntColony::new(graph, cfg).unwrap();
		colony.optimize(0).unwrap();
		// iteration 1: 3 * 1/4 on (0, 1); iteration 2: 0.75 * 0.5 + 0.75
		assert!((colony.pheromone()[[0, 1]] - 1.125).abs() < 1e-12);
		assert_eq!(colony.pheromone()[[1, 0]], 0.0);
		assert_eq!(colony.best_path(), Some(&[0, 1][..]));
	}

	#[test]
	fn test_invalid_graph_and_start() {
		let cfg = AcoConfig::default();
		assert!(AntColony::new(Array2::zeros((2, 3)), cfg.clone()).is_err());
		assert!(AntColony::new(Array2::from_elem((2, 2), -1.0), cfg.clone()).is_err());
		let bad_decay = AcoConfigBuilder::new().decay(1.5).build();
		assert!(AntColony::new(Array2::zeros((2, 2)), bad_decay).is_err());
		let mut colony = AntColony::new(Array2::zeros((2, 2)), cfg).unwrap();
		assert!(matches!(colony.optimize(2), Err(HeuristicError::InvalidConfig(_))));
		assert!(graph_from_edges(2, &[(0, 5, 1.0)]).is_err());
	}

	#[test]
	fn test_single_node_graph() {
		let cfg = AcoConfigBuilder::new().group_size(2).max_iter(3).seed(4).build();
		let mut colony = AntColony::new(Array2::zeros((1, 1)), cfg).unwrap();
		colony.optimize(0).unwrap();
		assert_eq!(colony.best_path(), Some(&[0][..]));
		assert_eq!(colony.best_distance(), 0.0);
	}
}
