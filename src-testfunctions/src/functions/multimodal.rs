//! Multimodal test functions
//!
//! These functions have multiple local minima and are used to test the global
//! search capabilities and exploration of optimization algorithms.

use ndarray::Array1;
use std::f64::consts::{E, PI};

/// Ackley function - nearly flat outer region with a deep central hole
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-32.768, 32.768]
pub fn ackley(x: &Array1<f64>) -> f64 {
    let n = x.len() as f64;
    let (sq, cos) = x.iter().fold((0.0_f64, 0.0_f64), |(sq, cos), &xi| {
        (sq + xi * xi, cos + (2.0 * PI * xi).cos())
    });
    let distance_term = -20.0 * (-0.2 * (sq / n).sqrt()).exp();
    let ripple_term = -(cos / n).exp();
    distance_term + ripple_term + 20.0 + E
}

/// Rastrigin function - highly multimodal, regularly spaced minima
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-5.12, 5.12]
pub fn rastrigin(x: &Array1<f64>) -> f64 {
    let a = 10.0;
    a * x.len() as f64
        + x.iter()
            .map(|&xi| xi.powi(2) - a * (2.0 * PI * xi).cos())
            .sum::<f64>()
}

/// Griewank function - multimodal, challenging for large dimensions
/// Global minimum: f(x) = 0 at x = (0, 0, ..., 0)
/// Bounds: x_i in [-600, 600]
pub fn griewank(x: &Array1<f64>) -> f64 {
    let mut bowl = 0.0;
    let mut ripples = 1.0;
    for (i, &xi) in x.iter().enumerate() {
        bowl += xi * xi;
        ripples *= (xi / ((i + 1) as f64).sqrt()).cos();
    }
    1.0 + bowl / 4000.0 - ripples
}

/// Levy function
/// Global minimum: f(x) = 0 at x = (1, 1, ..., 1)
/// Bounds: x_i in [-10, 10]
pub fn levy(x: &Array1<f64>) -> f64 {
    let w: Vec<f64> = x.iter().map(|&xi| 1.0 + (xi - 1.0) / 4.0).collect();
    let d = w.len();
    let head = (PI * w[0]).sin().powi(2);
    let body: f64 = w[..d - 1]
        .iter()
        .map(|&wi| (wi - 1.0).powi(2) * (1.0 + 10.0 * (PI * wi + 1.0).sin().powi(2)))
        .sum();
    let tail = (w[d - 1] - 1.0).powi(2) * (1.0 + (2.0 * PI * w[d - 1]).sin().powi(2));
    head + body + tail
}
