use ndarray::{Array2, Zip};

/// Replaces exact zeros with `delta` so the logs and divisions below stay
/// finite. Only literal zeros are touched.
fn patch_zeros(y: &mut Array2<f64>, delta: f64) {
    y.mapv_inplace(|v| if v == 0.0 { v + delta } else { v });
}

/// Scalar cross-entropy: -Σ t·ln(y), divided by the batch size.
///
/// Consumes the prediction: zero entries are patched in place before the log.
pub fn forward(mut y: Array2<f64>, t: &Array2<f64>, batch_size: usize, delta: f64) -> f64 {
    patch_zeros(&mut y, delta);
    let total = Zip::from(t).and(&y).fold(0.0, |acc, &tv, &yv| acc - tv * yv.ln());
    total / batch_size as f64
}

/// Gradient w.r.t. the prediction on the explicit (non-shortcut) path: -t/y,
/// with the same zero patch applied first.
pub fn backward(mut y: Array2<f64>, t: &Array2<f64>, delta: f64) -> Array2<f64> {
    patch_zeros(&mut y, delta);
    Zip::from(t).and(&y).map_collect(|&tv, &yv| -tv / yv)
}
