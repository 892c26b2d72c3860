//! Weighted graphs with a known best Hamiltonian path, for ant colony runs
//!
//! Graphs are dense cost matrices: `graph[[i, j]]` is the cost of travelling
//! from node `i` to node `j`.

use ndarray::Array2;

/// Three nodes where the direct edge 0 -> 1 (cost 5) loses to the detour
/// 0 -> 2 -> 1 (cost 1 + 1). Best path from node 0: `[0, 2, 1]`, distance 2.
pub fn detour_triangle() -> Array2<f64> {
    let mut graph = Array2::zeros((3, 3));
    graph[[0, 1]] = 5.0;
    graph[[0, 2]] = 1.0;
    graph[[2, 1]] = 1.0;
    graph
}

/// Directed ring: stepping to the next node costs 1, any other move costs `detour`.
///
/// Best path from node 0 is `[0, 1, ..., n - 1]` with distance `n - 1`, as long
/// as `detour > 1`.
pub fn ring(n: usize, detour: f64) -> Array2<f64> {
    Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            0.0
        } else if j == (i + 1) % n {
            1.0
        } else {
            detour
        }
    })
}

/// Euclidean distance matrix between points in the plane
pub fn euclidean(points: &[(f64, f64)]) -> Array2<f64> {
    let n = points.len();
    Array2::from_shape_fn((n, n), |(i, j)| {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt()
    })
}

/// Points evenly spread on the unit circle; visiting them in order is optimal
pub fn circle_points(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|k| {
            let angle = 2.0 * std::f64::consts::PI * k as f64 / n as f64;
            (angle.cos(), angle.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_costs() {
        let g = ring(4, 10.0);
        assert_eq!(g[[0, 1]], 1.0);
        assert_eq!(g[[3, 0]], 1.0);
        assert_eq!(g[[0, 2]], 10.0);
        assert_eq!(g[[2, 2]], 0.0);
    }

    #[test]
    fn test_euclidean_is_symmetric() {
        let g = euclidean(&circle_points(6));
        for i in 0..6 {
            assert_eq!(g[[i, i]], 0.0);
            for j in 0..6 {
                assert!((g[[i, j]] - g[[j, i]]).abs() < 1e-15);
            }
        }
        // neighbours on a hexagon inscribed in the unit circle are 1 apart
        assert!((g[[0, 1]] - 1.0).abs() < 1e-12);
    }
}
