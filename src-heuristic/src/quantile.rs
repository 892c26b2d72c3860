/// Quantile `q` in `[0, 1]` with linear interpolation between closest ranks.
///
/// Returns `None` for an empty input. NaN entries sort last.
pub(crate) fn quantile(values: &[f64], q: f64) -> Option<f64> {
	if values.is_empty() {
		return None;
	}
	let mut sorted = values.to_vec();
	sorted.sort_by(|a, b| a.total_cmp(b));
	let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
	let lo = pos.floor() as usize;
	let hi = pos.ceil() as usize;
	Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_quantile_interpolates() {
		let v: Vec<f64> = (1..=10).map(|i| i as f64).collect();
		// rank 0.9 * 9 = 8.1 -> 9 + 0.1 * (10 - 9)
		assert!((quantile(&v, 0.9).unwrap() - 9.1).abs() < 1e-12);
		assert_eq!(quantile(&v, 0.0), Some(1.0));
		assert_eq!(quantile(&v, 1.0), Some(10.0));
		assert_eq!(quantile(&[], 0.5), None);
	}
}
