//! Name to solver constructor map
//!
//! Constructors take the hyperparameters as JSON; missing fields fall back to
//! the config defaults.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::afs::AfsConfig;
use crate::error::{HeuristicError, Result};
use crate::es::EsConfig;
use crate::gaussian_es::GaussianEsConfig;
use crate::pso::PsoConfig;
use crate::sa::SaConfig;
use crate::solver::Solver;

/// Builds a solver from JSON hyperparameters
pub type SolverFactory = fn(&Value) -> Result<Box<dyn Solver>>;

#[derive(Debug, Default, Clone)]
pub struct Registry {
	factories: BTreeMap<String, SolverFactory>,
}

/// Deserialize a config, treating `null` as "all defaults"
fn parse_config<C: DeserializeOwned + Default>(params: &Value) -> Result<C> {
	if params.is_null() {
		return Ok(C::default());
	}
	Ok(serde_json::from_value(params.clone())?)
}

fn pso(params: &Value) -> Result<Box<dyn Solver>> {
	let cfg: PsoConfig = parse_config(params)?;
	cfg.validate()?;
	Ok(Box::new(cfg))
}

fn es(params: &Value) -> Result<Box<dyn Solver>> {
	let cfg: EsConfig = parse_config(params)?;
	cfg.validate()?;
	Ok(Box::new(cfg))
}

fn gaussian_es(params: &Value) -> Result<Box<dyn Solver>> {
	let cfg: GaussianEsConfig = parse_config(params)?;
	cfg.validate()?;
	Ok(Box::new(cfg))
}

fn afs(params: &Value) -> Result<Box<dyn Solver>> {
	let cfg: AfsConfig = parse_config(params)?;
	cfg.validate()?;
	Ok(Box::new(cfg))
}

fn sa(params: &Value) -> Result<Box<dyn Solver>> {
	let cfg: SaConfig = parse_config(params)?;
	cfg.validate()?;
	Ok(Box::new(cfg))
}

impl Registry {
	/// Empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding `pso`, `es`, `gaussian_es`, `afs` and `sa`
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		let builtins: [(&str, SolverFactory); 5] =
			[("pso", pso), ("es", es), ("gaussian_es", gaussian_es), ("afs", afs), ("sa", sa)];
		for (name, factory) in builtins {
			registry.factories.insert(name.to_string(), factory);
		}
		registry
	}

	/// Add a constructor; a name can only be registered once
	pub fn register(&mut self, name: &str, factory: SolverFactory) -> Result<()> {
		if self.factories.contains_key(name) {
			return Err(HeuristicError::DuplicateRegistration(name.to_string()));
		}
		self.factories.insert(name.to_string(), factory);
		log::debug!("registered solver `{}`", name);
		Ok(())
	}

	/// Build the solver registered under `name`; the config is validated here
	pub fn create(&self, name: &str, params: &Value) -> Result<Box<dyn Solver>> {
		let factory = self.factories.get(name).ok_or_else(|| HeuristicError::UnknownSolver(name.to_string()))?;
		factory(params)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.factories.contains_key(name)
	}

	/// Registered names in sorted order
	pub fn names(&self) -> Vec<&str> {
		self.factories.keys().map(String::as_str).collect()
	}
}
