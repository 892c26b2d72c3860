use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single optimization iteration record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
	/// Iteration number (1 based)
	pub iteration: usize,
	/// Best fitness known after this iteration
	pub best_fitness: f64,
	/// Whether this iteration improved the best known fitness
	pub is_improvement: bool,
}

/// Best-fitness history of one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trajectory {
	records: Vec<IterationRecord>,
}

impl Trajectory {
	pub fn new() -> Self {
		Self::default()
	}

	pub(crate) fn clear(&mut self) {
		self.records.clear();
	}

	/// Append the best fitness after `iteration`; the caller decides if it improved.
	pub(crate) fn push(&mut self, iteration: usize, best_fitness: f64, is_improvement: bool) {
		self.records.push(IterationRecord { iteration, best_fitness, is_improvement });
	}

	/// Same history with the fitness sign flipped, for minimizers reported as maximizers
	pub(crate) fn negated(&self) -> Trajectory {
		let records = self
			.records
			.iter()
			.map(|r| IterationRecord { best_fitness: -r.best_fitness, ..r.clone() })
			.collect();
		Trajectory { records }
	}

	pub fn records(&self) -> &[IterationRecord] {
		&self.records
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Best fitness per iteration, in order
	pub fn best_fitness(&self) -> Vec<f64> {
		self.records.iter().map(|r| r.best_fitness).collect()
	}

	/// Number of iterations that improved the best fitness
	pub fn num_improvements(&self) -> usize {
		self.records.iter().filter(|r| r.is_improvement).count()
	}

	/// Iteration (1 based) at which the final best was found, `None` when no
	/// iteration improved on the starting point
	pub fn best_iteration(&self) -> Option<usize> {
		self.records.iter().rev().find(|r| r.is_improvement).map(|r| r.iteration)
	}

	/// Save all recorded iterations to a CSV file with a header row
	pub fn save_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		if let Some(parent) = path.as_ref().parent() {
			if !parent.as_os_str().is_empty() {
				std::fs::create_dir_all(parent)?;
			}
		}
		let mut writer = csv::Writer::from_path(path)?;
		for record in &self.records {
			writer.serialize(record)?;
		}
		writer.flush()?;
		Ok(())
	}
}
