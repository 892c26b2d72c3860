//! Optimization test functions library
//!
//! Benchmark objectives for checking the metaheuristics, all in the
//! minimization convention, plus weighted graphs for the ant colony:
//!
//! - **Unimodal**: single global optimum (sphere, rosenbrock, ...)
//! - **Multimodal**: many local minima (ackley, rastrigin, ...)
//! - **Graphs**: cost matrices with a known best Hamiltonian path
//!
//! # Example
//!
//! ```rust
//! use ndarray::Array1;
//! use swarmkit_testfunctions::*;
//!
//! let x = Array1::from_vec(vec![0.0, 0.0]);
//! assert_eq!(sphere(&x), 0.0);
//!
//! let meta = get_function_metadata();
//! let bounds = meta["sphere"].bounds_for(3);
//! assert_eq!(bounds, vec![(-5.0, 5.0); 3]);
//! ```

use ndarray::Array1;
use std::collections::HashMap;

pub mod functions;
pub mod graphs;

pub use functions::*;

/// Objective signature shared by every test function
pub type TestFunction = fn(&Array1<f64>) -> f64;

/// Metadata for a test function: default box, dimensionality and optimum
#[derive(Debug, Clone)]
pub struct FunctionMetadata {
    /// Function name
    pub name: &'static str,
    pub function: TestFunction,
    /// Bounds applied to every dimension (min, max)
    pub bounds: (f64, f64),
    /// Fixed dimension, `None` when the function accepts any dimension
    pub fixed_dim: Option<usize>,
    /// Location of the global minimum for a given dimension
    pub minimizer: fn(usize) -> Vec<f64>,
    /// Value of the global minimum
    pub minimum: f64,
    pub multimodal: bool,
    pub description: &'static str,
}

impl FunctionMetadata {
    /// Dimension actually used when `requested` is asked for
    pub fn dim(&self, requested: usize) -> usize {
        self.fixed_dim.unwrap_or(requested)
    }

    /// One `(min, max)` pair per dimension
    pub fn bounds_for(&self, requested: usize) -> Vec<(f64, f64)> {
        vec![self.bounds; self.dim(requested)]
    }

    pub fn minimizer_for(&self, requested: usize) -> Array1<f64> {
        Array1::from((self.minimizer)(self.dim(requested)))
    }
}

fn origin(d: usize) -> Vec<f64> {
    vec![0.0; d]
}

fn ones(d: usize) -> Vec<f64> {
    vec![1.0; d]
}

/// Get metadata for all available test functions
pub fn get_function_metadata() -> HashMap<String, FunctionMetadata> {
    let entries = [
        FunctionMetadata {
            name: "sphere",
            function: sphere,
            bounds: (-5.0, 5.0),
            fixed_dim: None,
            minimizer: origin,
            minimum: 0.0,
            multimodal: false,
            description: "N-dimensional quadratic function",
        },
        FunctionMetadata {
            name: "sum_squares",
            function: sum_squares,
            bounds: (-10.0, 10.0),
            fixed_dim: None,
            minimizer: origin,
            minimum: 0.0,
            multimodal: false,
            description: "N-dimensional axis parallel hyper-ellipsoid",
        },
        FunctionMetadata {
            name: "rosenbrock",
            function: rosenbrock,
            bounds: (-2.048, 2.048),
            fixed_dim: None,
            minimizer: ones,
            minimum: 0.0,
            multimodal: false,
            description: "N-dimensional banana function",
        },
        FunctionMetadata {
            name: "zakharov",
            function: zakharov,
            bounds: (-5.0, 10.0),
            fixed_dim: None,
            minimizer: origin,
            minimum: 0.0,
            multimodal: false,
            description: "N-dimensional plate shaped function",
        },
        FunctionMetadata {
            name: "booth",
            function: booth,
            bounds: (-10.0, 10.0),
            fixed_dim: Some(2),
            minimizer: |_| vec![1.0, 3.0],
            minimum: 0.0,
            multimodal: false,
            description: "2D unimodal function",
        },
        FunctionMetadata {
            name: "matyas",
            function: matyas,
            bounds: (-10.0, 10.0),
            fixed_dim: Some(2),
            minimizer: origin,
            minimum: 0.0,
            multimodal: false,
            description: "2D plate shaped function",
        },
        FunctionMetadata {
            name: "ackley",
            function: ackley,
            bounds: (-32.768, 32.768),
            fixed_dim: None,
            minimizer: origin,
            minimum: 0.0,
            multimodal: true,
            description: "N-dimensional multimodal function with a deep central hole",
        },
        FunctionMetadata {
            name: "rastrigin",
            function: rastrigin,
            bounds: (-5.12, 5.12),
            fixed_dim: None,
            minimizer: origin,
            minimum: 0.0,
            multimodal: true,
            description: "N-dimensional highly multimodal function",
        },
        FunctionMetadata {
            name: "griewank",
            function: griewank,
            bounds: (-600.0, 600.0),
            fixed_dim: None,
            minimizer: origin,
            minimum: 0.0,
            multimodal: true,
            description: "N-dimensional multimodal function",
        },
        FunctionMetadata {
            name: "levy",
            function: levy,
            bounds: (-10.0, 10.0),
            fixed_dim: None,
            minimizer: ones,
            minimum: 0.0,
            multimodal: true,
            description: "N-dimensional multimodal function",
        },
    ];
    entries
        .into_iter()
        .map(|meta| (meta.name.to_string(), meta))
        .collect()
}

/// Look a test function up by name
pub fn get_function(name: &str) -> Option<TestFunction> {
    get_function_metadata().get(name).map(|meta| meta.function)
}

/// Per-dimension bounds of a test function, `None` for an unknown name
pub fn get_function_bounds(name: &str, dim: usize) -> Option<Vec<(f64, f64)>> {
    get_function_metadata()
        .get(name)
        .map(|meta| meta.bounds_for(dim))
}

/// Sorted names of all test functions
pub fn function_names() -> Vec<String> {
    let mut names: Vec<String> = get_function_metadata().into_keys().collect();
    names.sort();
    names
}
