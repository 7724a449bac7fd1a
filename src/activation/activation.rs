use ndarray::{Array1, Array2, ArrayView1, Zip};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// The nonlinearity applied after a layer's affine transform.
///
/// Sigmoid, ReLU and Identity are element-wise.  Softmax is vector-valued and
/// operates per logical sample within a batch, so both directions take the
/// batch size and regroup rows before touching the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Sigmoid,
    Relu,
    Softmax,
    Identity,
}

impl Activation {
    /// Applies the activation to a pre-activation tensor.
    pub fn forward(&self, z: &Array2<f64>, batch_size: usize) -> Array2<f64> {
        match self {
            Activation::Sigmoid => z.mapv(|v| 1.0 / (1.0 + (-v).exp())),
            Activation::Relu => z.mapv(|v| v.max(0.0)),
            Activation::Softmax => softmax_forward(z, batch_size),
            Activation::Identity => z.clone(),
        }
    }

    /// Propagates `upstream` through the activation's derivative.
    ///
    /// `z` is the cached pre-activation and `a` the matching post-activation.
    /// Sigmoid differentiates through `a`; the others read `z`.  The ReLU
    /// branch keeps the raw pre-activation value as the active-unit factor
    /// (`z * upstream` where `z > 0`), matching the engine's established
    /// update rule rather than the textbook 0/1 mask.
    pub fn backward(
        &self,
        z: &Array2<f64>,
        a: &Array2<f64>,
        upstream: &Array2<f64>,
        batch_size: usize,
    ) -> Array2<f64> {
        match self {
            Activation::Sigmoid => a.mapv(|y| y * (1.0 - y)) * upstream,
            Activation::Relu => Zip::from(z)
                .and(upstream)
                .map_collect(|&zv, &u| if zv > 0.0 { zv * u } else { 0.0 }),
            Activation::Softmax => softmax_backward(z, upstream, batch_size),
            Activation::Identity => upstream.clone(),
        }
    }
}

impl FromStr for Activation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "sigmoid" => Ok(Activation::Sigmoid),
            "relu" => Ok(Activation::Relu),
            "softmax" => Ok(Activation::Softmax),
            "identity" => Ok(Activation::Identity),
            other => Err(Error::UnsupportedActivation {
                name: other.to_string(),
            }),
        }
    }
}

/// Numerically stable softmax of one sample row: exp(x - max) / sum.
fn softmax_row(row: ArrayView1<f64>) -> Array1<f64> {
    let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let exps = row.mapv(|v| (v - max).exp());
    let sum = exps.sum();
    exps / sum
}

/// Row-wise softmax over logical samples.
///
/// The tensor is regrouped to `(batch_size, flat)` so that one row holds one
/// sample, whatever shape the layer produced, then restored afterwards.
fn softmax_forward(z: &Array2<f64>, batch_size: usize) -> Array2<f64> {
    let (rows, cols) = z.dim();
    let flat = rows * cols / batch_size;
    let grouped = z
        .to_shape((batch_size, flat))
        .expect("pre-activation tensor must be in standard layout");

    let mut out = Array2::<f64>::zeros((batch_size, flat));
    for (b, sample) in grouped.outer_iter().enumerate() {
        out.row_mut(b).assign(&softmax_row(sample));
    }

    out.into_shape_with_order((rows, cols))
        .expect("softmax output restores the input shape")
}

/// Full softmax Jacobian per sample.
///
/// For output index i: downstream_i = Σ_j J_ij · upstream_j with
/// J_ii = s_i(1-s_i) and J_ij = -s_i·s_j.  Samples never mix.
fn softmax_backward(z: &Array2<f64>, upstream: &Array2<f64>, batch_size: usize) -> Array2<f64> {
    let (rows, cols) = z.dim();
    let flat = rows * cols / batch_size;
    let grouped_z = z
        .to_shape((batch_size, flat))
        .expect("pre-activation tensor must be in standard layout");
    let grouped_up = upstream
        .to_shape((batch_size, flat))
        .expect("upstream gradient must match the pre-activation layout");

    let mut out = Array2::<f64>::zeros((batch_size, flat));
    for b in 0..batch_size {
        let s = softmax_row(grouped_z.row(b));
        let u = grouped_up.row(b);
        let mut o = out.row_mut(b);
        for i in 0..flat {
            let mut acc = 0.0;
            for j in 0..flat {
                let jac = if i == j {
                    s[i] * (1.0 - s[i])
                } else {
                    -s[i] * s[j]
                };
                acc += jac * u[j];
            }
            o[i] = acc;
        }
    }

    out.into_shape_with_order((rows, cols))
        .expect("softmax gradient restores the input shape")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn sigmoid_forward_matches_closed_form() {
        let z = arr2(&[[0.0, 2.0], [-2.0, 10.0]]);
        let a = Activation::Sigmoid.forward(&z, 1);
        assert_abs_diff_eq!(a[[0, 0]], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(a[[0, 1]], 1.0 / (1.0 + (-2.0f64).exp()), epsilon = 1e-12);
        assert_abs_diff_eq!(a[[1, 0]], 1.0 / (1.0 + 2.0f64.exp()), epsilon = 1e-12);
    }

    #[test]
    fn sigmoid_backward_uses_post_activation() {
        let z = arr2(&[[0.0]]);
        let a = Activation::Sigmoid.forward(&z, 1);
        let upstream = arr2(&[[2.0]]);
        let down = Activation::Sigmoid.backward(&z, &a, &upstream, 1);
        // y(1-y)·upstream with y = 0.5
        assert_abs_diff_eq!(down[[0, 0]], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn relu_backward_keeps_raw_preactivation_for_active_units() {
        let z = arr2(&[[3.0, -1.0, 0.0]]);
        let a = Activation::Relu.forward(&z, 1);
        let upstream = arr2(&[[2.0, 2.0, 2.0]]);
        let down = Activation::Relu.backward(&z, &a, &upstream, 1);
        // active unit scales by z itself, inactive units vanish
        assert_abs_diff_eq!(down[[0, 0]], 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(down[[0, 1]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(down[[0, 2]], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn softmax_rows_sum_to_one() {
        let z = arr2(&[[1.0, 2.0, 3.0], [-4.0, 0.0, 9.0]]);
        let a = Activation::Softmax.forward(&z, 2);
        for row in a.outer_iter() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn softmax_is_shift_invariant() {
        let z = arr2(&[[1.0, 2.0, 3.0]]);
        let shifted = z.mapv(|v| v + 1e6);
        let a = Activation::Softmax.forward(&z, 1);
        let b = Activation::Softmax.forward(&shifted, 1);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-8);
        }
    }

    #[test]
    fn softmax_does_not_mix_samples() {
        // Two identical samples stacked as one batch must each softmax alone.
        let single = arr2(&[[1.0, 2.0]]);
        let stacked = arr2(&[[1.0, 2.0], [1.0, 2.0]]);
        let alone = Activation::Softmax.forward(&single, 1);
        let batched = Activation::Softmax.forward(&stacked, 2);
        for b in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(batched[[b, j]], alone[[0, j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn softmax_jacobian_matches_shortcut_for_one_hot_target() {
        // For CE loss with upstream = -t/s the Jacobian path must reproduce s - t.
        let z = arr2(&[[0.3, -1.2, 2.0]]);
        let s = Activation::Softmax.forward(&z, 1);
        let t = arr2(&[[0.0, 0.0, 1.0]]);
        let upstream = Zip::from(&t).and(&s).map_collect(|&tv, &sv| -tv / sv);
        let down = Activation::Softmax.backward(&z, &s, &upstream, 1);
        for j in 0..3 {
            assert_abs_diff_eq!(down[[0, j]], s[[0, j]] - t[[0, j]], epsilon = 1e-10);
        }
    }

    #[test]
    fn identity_passes_gradient_through() {
        let z = arr2(&[[1.0, -2.0]]);
        let a = Activation::Identity.forward(&z, 1);
        assert_eq!(a, z);
        let upstream = arr2(&[[0.25, 4.0]]);
        let down = Activation::Identity.backward(&z, &a, &upstream, 1);
        assert_eq!(down, upstream);
    }

    #[test]
    fn unknown_kind_name_is_rejected() {
        assert!("tanh".parse::<Activation>().is_err());
        assert_eq!("relu".parse::<Activation>().unwrap(), Activation::Relu);
    }
}
