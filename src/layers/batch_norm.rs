use ndarray::Array2;

/// Standardizes a tensor to zero mean and unit variance over all elements,
/// with `delta` keeping the division finite for constant inputs.
///
/// Forward direction only: there is no backward counterpart and the op is
/// not part of network propagation.
pub fn batch_normalize(x: &Array2<f64>, delta: f64) -> Array2<f64> {
    let mean = x.mean().unwrap_or(0.0);
    let std = x.std(0.0);
    x.mapv(|v| (v - mean) / (std + delta))
}
