//! Capability traits for the problem specific callables handed to `setup()`
//!
//! Plain closures and function items work directly:
//!
//! ```rust
//! use ndarray::Array1;
//! use rand::rngs::StdRng;
//! use rand::Rng;
//! use swarmkit_heuristic::{Fitness, Sampler};
//!
//! fn parabola(x: &Array1<f64>) -> f64 {
//!     -(x[0] - 3.0).powi(2)
//! }
//! assert_eq!(parabola.evaluate(&Array1::from(vec![3.0])).unwrap(), 0.0);
//!
//! let mut init = |rng: &mut StdRng| Array1::from(vec![rng.random_range(-10.0..=10.0)]);
//! let mut rng: StdRng = rand::SeedableRng::seed_from_u64(7);
//! assert_eq!(init.sample(&mut rng).len(), 1);
//! ```

use std::error::Error;

use ndarray::Array1;
use rand::rngs::StdRng;

use crate::error::{HeuristicError, Result};

/// Scores a candidate point
pub trait Fitness {
	fn evaluate(&self, point: &Array1<f64>) -> Result<f64>;
}

impl<F> Fitness for F
where
	F: Fn(&Array1<f64>) -> f64,
{
	fn evaluate(&self, point: &Array1<f64>) -> Result<f64> {
		Ok(self(point))
	}
}

/// Adapter for fitness closures that can fail.
///
/// The error is passed through as `HeuristicError::Fitness`; the run stops at
/// the first failure and the optimizer state should be discarded.
pub struct Fallible<F>(pub F);

impl<F, E> Fitness for Fallible<F>
where
	F: Fn(&Array1<f64>) -> std::result::Result<f64, E>,
	E: Into<Box<dyn Error + Send + Sync>>,
{
	fn evaluate(&self, point: &Array1<f64>) -> Result<f64> {
		(self.0)(point).map_err(|e| HeuristicError::Fitness(e.into()))
	}
}

/// Produces a fresh vector (position, velocity, direction, mean, variance)
pub trait Sampler {
	fn sample(&mut self, rng: &mut StdRng) -> Array1<f64>;
}

impl<F> Sampler for F
where
	F: FnMut(&mut StdRng) -> Array1<f64>,
{
	fn sample(&mut self, rng: &mut StdRng) -> Array1<f64> {
		self(rng)
	}
}

/// Produces a fresh scalar, e.g. the initial fish speed
pub trait ScalarSampler {
	fn sample(&mut self, rng: &mut StdRng) -> f64;
}

impl<F> ScalarSampler for F
where
	F: FnMut(&mut StdRng) -> f64,
{
	fn sample(&mut self, rng: &mut StdRng) -> f64 {
		self(rng)
	}
}

/// Maps a position back into the feasible domain
pub trait Repair {
	fn repair(&self, position: Array1<f64>) -> Array1<f64>;
}

impl<F> Repair for F
where
	F: Fn(Array1<f64>) -> Array1<f64>,
{
	fn repair(&self, position: Array1<f64>) -> Array1<f64> {
		self(position)
	}
}

/// Clamp every component to its `(lower, upper)` bound
#[derive(Debug, Clone)]
pub struct Clip {
	bounds: Vec<(f64, f64)>,
}

impl Clip {
	pub fn new(bounds: &[(f64, f64)]) -> Self {
		Self { bounds: bounds.to_vec() }
	}
}

impl Repair for Clip {
	fn repair(&self, mut position: Array1<f64>) -> Array1<f64> {
		for (x, &(lo, hi)) in position.iter_mut().zip(self.bounds.iter()) {
			*x = x.clamp(lo, hi);
		}
		position
	}
}
