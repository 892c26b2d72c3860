use ndarray::{Array1, ArrayView1, Zip};

/// Softmax of `logits + mask`, shifted by the row maximum before exponentiating.
///
/// Masked entries carry `-inf` and get probability exactly 0. When every entry
/// is suppressed (no finite maximum) the result degenerates to uniform.
pub(crate) fn masked_softmax(logits: ArrayView1<f64>, mask: ArrayView1<f64>) -> Array1<f64> {
	let mut shifted = Zip::from(logits).and(mask).map_collect(|&l, &m| l + m);
	let max = shifted.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
	if !max.is_finite() {
		let n = shifted.len();
		return Array1::from_elem(n, 1.0 / n as f64);
	}
	shifted.mapv_inplace(|v| (v - max).exp());
	let total = shifted.sum();
	shifted / total
}
