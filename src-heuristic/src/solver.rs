//! Uniform front-end over the continuous optimizers
//!
//! A `Solver` maximizes an objective inside a box. Each optimizer config
//! implements it by choosing bounded initializers for its hooks; the
//! minimizing ES variants see the negated objective and report it back with
//! the sign restored. Optimizers without a repair hook evaluate the objective
//! on the box-clipped point, so every reported `x` lies inside the bounds.

use std::fmt;

use ndarray::Array1;
use serde::Serialize;

use crate::afs::{AfsConfig, ArtificialFishSwarm};
use crate::error::{ensure, HeuristicError, Result};
use crate::es::{EsConfig, EvolutionStrategy};
use crate::gaussian_es::{GaussianEs, GaussianEsConfig};
use crate::hooks::{Clip, Repair};
use crate::init::{constant, constant_scalar, standard_normal, uniform_box};
use crate::pso::{ParticleSwarm, PsoConfig};
use crate::recorder::Trajectory;
use crate::sa::{SaConfig, SimulatedAnnealing};

/// Objective maximized by a `Solver`
pub type Objective<'a> = &'a dyn Fn(&Array1<f64>) -> f64;

/// Result of one `Solver::solve` call
#[derive(Clone, Serialize)]
pub struct Report {
	/// Registered name of the solver that produced the report
	pub solver: String,
	/// Best point found, inside the bounds
	pub x: Array1<f64>,
	/// Objective value at `x` (higher is better)
	pub fitness: f64,
	pub nit: usize,
	pub nfev: usize,
	/// Best objective value per iteration
	pub trajectory: Trajectory,
}

impl fmt::Debug for Report {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Report")
			.field("solver", &self.solver)
			.field("x", &format!("len={}", self.x.len()))
			.field("fitness", &self.fitness)
			.field("nit", &self.nit)
			.field("nfev", &self.nfev)
			.field("trajectory", &format!("len={}", self.trajectory.len()))
			.finish()
	}
}

/// Box-bounded maximizer
pub trait Solver {
	fn name(&self) -> &'static str;

	fn solve(&self, objective: Objective<'_>, bounds: &[(f64, f64)]) -> Result<Report>;
}

fn check_bounds(bounds: &[(f64, f64)]) -> Result<()> {
	ensure(!bounds.is_empty(), "bounds must have at least one dimension")?;
	for (i, &(lo, hi)) in bounds.iter().enumerate() {
		ensure(
			lo.is_finite() && hi.is_finite() && lo <= hi,
			format!("bound {} is not a finite interval: ({}, {})", i, lo, hi),
		)?;
	}
	Ok(())
}

/// Symmetric box of +/-10% of each range, used for initial velocities
fn velocity_bounds(bounds: &[(f64, f64)]) -> Vec<(f64, f64)> {
	bounds
		.iter()
		.map(|&(lo, hi)| {
			let v = 0.1 * (hi - lo);
			(-v, v)
		})
		.collect()
}

fn missing(what: &str) -> HeuristicError {
	HeuristicError::Numerical(format!("optimizer finished without a {}", what))
}

impl Solver for PsoConfig {
	fn name(&self) -> &'static str {
		"pso"
	}

	fn solve(&self, objective: Objective<'_>, bounds: &[(f64, f64)]) -> Result<Report> {
		check_bounds(bounds)?;
		let mut pso = ParticleSwarm::new(self.clone())?;
		pso.setup(objective, uniform_box(bounds), uniform_box(&velocity_bounds(bounds)))
			.repair_with(Clip::new(bounds));
		pso.optimize()?;
		let x = pso.best_position().ok_or_else(|| missing("best position"))?;
		Ok(Report {
			solver: self.name().into(),
			x,
			fitness: pso.best_fitness(),
			nit: pso.n_iter(),
			nfev: pso.evaluations(),
			trajectory: pso.trajectory().clone(),
		})
	}
}

impl Solver for EsConfig {
	fn name(&self) -> &'static str {
		"es"
	}

	fn solve(&self, objective: Objective<'_>, bounds: &[(f64, f64)]) -> Result<Report> {
		check_bounds(bounds)?;
		let clip = Clip::new(bounds);
		let cost = |x: &Array1<f64>| -objective(&clip.repair(x.clone()));
		let mut es = EvolutionStrategy::new(self.clone())?;
		es.setup(cost, uniform_box(bounds));
		es.optimize()?;
		let x = es.generation().cloned().ok_or_else(|| missing("generation"))?;
		Ok(Report {
			solver: self.name().into(),
			x: clip.repair(x),
			fitness: -es.fitness(),
			nit: self.max_iter,
			nfev: es.evaluations(),
			trajectory: es.trajectory().negated(),
		})
	}
}

impl Solver for GaussianEsConfig {
	fn name(&self) -> &'static str {
		"gaussian_es"
	}

	fn solve(&self, objective: Objective<'_>, bounds: &[(f64, f64)]) -> Result<Report> {
		check_bounds(bounds)?;
		let clip = Clip::new(bounds);
		let cost = |x: &Array1<f64>| -objective(&clip.repair(x.clone()));
		let mean = Array1::from_iter(bounds.iter().map(|&(lo, hi)| 0.5 * (lo + hi)));
		let variance = Array1::from_iter(bounds.iter().map(|&(lo, hi)| (0.25 * (hi - lo)).powi(2)));
		let mut es = GaussianEs::new(self.clone())?;
		es.setup(cost, mean, variance)?;
		es.optimize()?;
		let x = es.best_sample().cloned().ok_or_else(|| missing("best sample"))?;
		Ok(Report {
			solver: self.name().into(),
			x: clip.repair(x),
			fitness: -es.best_fitness(),
			nit: self.max_iter,
			nfev: es.evaluations(),
			trajectory: es.trajectory().negated(),
		})
	}
}

impl Solver for AfsConfig {
	fn name(&self) -> &'static str {
		"afs"
	}

	fn solve(&self, objective: Objective<'_>, bounds: &[(f64, f64)]) -> Result<Report> {
		check_bounds(bounds)?;
		let clip = Clip::new(bounds);
		let fitness = |x: &Array1<f64>| objective(&clip.repair(x.clone()));
		let speed = 0.1 * bounds.iter().map(|&(lo, hi)| hi - lo).sum::<f64>() / bounds.len() as f64;
		let mut afs = ArtificialFishSwarm::new(self.clone())?;
		afs.setup(fitness, uniform_box(bounds), standard_normal(bounds.len()), constant_scalar(speed));
		afs.optimize()?;
		let best = afs.best_fish().ok_or_else(|| missing("best fish"))?;
		Ok(Report {
			solver: self.name().into(),
			x: clip.repair(best.position().clone()),
			fitness: best.fitness(),
			nit: self.max_iter,
			nfev: afs.evaluations(),
			trajectory: afs.trajectory().clone(),
		})
	}
}

impl Solver for SaConfig {
	fn name(&self) -> &'static str {
		"sa"
	}

	fn solve(&self, objective: Objective<'_>, bounds: &[(f64, f64)]) -> Result<Report> {
		check_bounds(bounds)?;
		let clip = Clip::new(bounds);
		let fitness = |x: &Array1<f64>| objective(&clip.repair(x.clone()));
		let start = Array1::from_iter(bounds.iter().map(|&(lo, hi)| 0.5 * (lo + hi)));
		let mut sa = SimulatedAnnealing::new(self.clone())?;
		sa.setup(fitness, constant(start));
		sa.optimize()?;
		let x = sa.best_individual().cloned().ok_or_else(|| missing("best individual"))?;
		Ok(Report {
			solver: self.name().into(),
			x: clip.repair(x),
			fitness: sa.best_fitness(),
			nit: self.max_iter,
			nfev: sa.evaluations(),
			trajectory: sa.trajectory().clone(),
		})
	}
}
