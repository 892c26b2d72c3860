use ndarray::Array1;

/// Index and value of the largest entry; ties keep the first one.
pub(crate) fn argmax(v: &Array1<f64>) -> (usize, f64) {
	let mut best_i = 0usize;
	let mut best_v = v[0];
	for (i, &val) in v.iter().enumerate() {
		if val > best_v {
			best_v = val;
			best_i = i;
		}
	}
	(best_i, best_v)
}

/// Indices of the `k` smallest entries, smallest first; equal values keep their order.
pub(crate) fn smallest_k(v: &Array1<f64>, k: usize) -> Vec<usize> {
	let mut order: Vec<usize> = (0..v.len()).collect();
	order.sort_by(|&a, &b| v[a].total_cmp(&v[b]));
	order.truncate(k);
	order
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_argmax_first_wins() {
		let v = Array1::from(vec![1.0, 3.0, 3.0, -2.0]);
		assert_eq!(argmax(&v), (1, 3.0));
	}

	#[test]
	fn test_smallest_k_stable() {
		let v = Array1::from(vec![4.0, 1.0, 2.0, 1.0, 0.5]);
		assert_eq!(smallest_k(&v, 3), vec![4, 1, 3]);
	}
}
