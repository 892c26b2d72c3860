use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{check_dim, HeuristicError, Result};

/// Root-mean-square distance between two points of equal length
pub(crate) fn rms_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
	let n = a.len().max(1) as f64;
	let sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
	(sq / n).sqrt()
}

/// Unit-length copy of `direction`; an exactly-zero vector is an error.
pub(crate) fn normalize(direction: &Array1<f64>) -> Result<Array1<f64>> {
	let norm = direction.dot(direction).sqrt();
	if norm == 0.0 {
		return Err(HeuristicError::ZeroDirection);
	}
	Ok(direction / norm)
}

/// Stack `rows` into a matrix, all rows must have `dim` components.
pub(crate) fn stack_rows(rows: &[Array1<f64>], dim: usize) -> Result<Array2<f64>> {
	let mut out = Array2::zeros((rows.len(), dim));
	for (i, row) in rows.iter().enumerate() {
		check_dim(dim, row.len())?;
		out.row_mut(i).assign(row);
	}
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rms_distance() {
		let a = Array1::from(vec![0.0, 0.0, 0.0, 0.0]);
		let b = Array1::from(vec![2.0, 2.0, 2.0, 2.0]);
		assert_eq!(rms_distance(a.view(), b.view()), 2.0);
	}

	#[test]
	fn test_normalize_zero_vector_fails() {
		let zero = Array1::zeros(3);
		assert!(matches!(normalize(&zero), Err(HeuristicError::ZeroDirection)));
		let unit = normalize(&Array1::from(vec![3.0, 4.0])).unwrap();
		assert!((unit[0] - 0.6).abs() < 1e-15 && (unit[1] - 0.8).abs() < 1e-15);
	}

	#[test]
	fn test_stack_rows_checks_shape() {
		let rows = vec![Array1::zeros(2), Array1::zeros(3)];
		assert!(matches!(
			stack_rows(&rows, 2),
			Err(HeuristicError::DimensionMismatch { expected: 2, found: 3 })
		));
	}
}
