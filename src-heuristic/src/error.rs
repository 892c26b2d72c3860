//! Error type shared by every optimizer

/// Errors raised while configuring or running an optimizer
#[derive(Debug, thiserror::Error)]
pub enum HeuristicError {
	#[error("{0} was optimized before setup(); supply the fitness and initializers first")]
	NotConfigured(&'static str),

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("dimension mismatch: expected {expected} components, got {found}")]
	DimensionMismatch { expected: usize, found: usize },

	#[error("cannot normalize a zero-length direction vector")]
	ZeroDirection,

	#[error("numerical error: {0}")]
	Numerical(String),

	#[error("fitness evaluation failed: {0}")]
	Fitness(#[source] Box<dyn std::error::Error + Send + Sync>),

	#[error("solver `{0}` is already registered")]
	DuplicateRegistration(String),

	#[error("solver `{0}` is not registered")]
	UnknownSolver(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Csv(#[from] csv::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, HeuristicError>;

/// Fail with `DimensionMismatch` unless `found == expected`.
pub(crate) fn check_dim(expected: usize, found: usize) -> Result<()> {
	if expected == found { Ok(()) } else { Err(HeuristicError::DimensionMismatch { expected, found }) }
}

/// Fail with `InvalidConfig` carrying `message` unless `ok`.
pub(crate) fn ensure(ok: bool, message: impl Into<String>) -> Result<()> {
	if ok { Ok(()) } else { Err(HeuristicError::InvalidConfig(message.into())) }
}
