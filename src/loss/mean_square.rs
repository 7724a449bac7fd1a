use ndarray::Array2;

/// Scalar mean-square error: 0.5·Σ(y-t)² summed over the whole batch.
///
/// The sum is deliberately not divided by the batch size; larger batches
/// produce proportionally larger errors and gradients.
pub fn forward(y: &Array2<f64>, t: &Array2<f64>) -> f64 {
    let diff = y - t;
    0.5 * diff.mapv(|d| d * d).sum()
}

/// Gradient w.r.t. the prediction: y - t.
pub fn backward(y: &Array2<f64>, t: &Array2<f64>) -> Array2<f64> {
    y - t
}
