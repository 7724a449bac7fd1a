use ndarray::Array2;

use crate::activation::Activation;

/// One fully-connected layer: a weight matrix of shape `(fan_in, fan_out)`,
/// a single scalar bias broadcast across every output unit, and the
/// activation applied after the affine transform.
///
/// The scalar bias (rather than a per-unit vector) is a deliberate property
/// of this engine and is carried consistently through forward, backward and
/// the update step.
#[derive(Debug, Clone)]
pub struct Dense {
    pub weights: Array2<f64>,
    pub bias: f64,
    pub activation: Activation,
}

impl Dense {
    pub fn new(weights: Array2<f64>, bias: f64, activation: Activation) -> Dense {
        Dense {
            weights,
            bias,
            activation,
        }
    }

    pub fn fan_in(&self) -> usize {
        self.weights.nrows()
    }

    pub fn fan_out(&self) -> usize {
        self.weights.ncols()
    }

    /// Applies pre-computed gradients scaled by the learning rate.
    pub fn apply_gradients(&mut self, weights_grad: &Array2<f64>, bias_grad: f64, lr: f64) {
        self.weights.scaled_add(-lr, weights_grad);
        self.bias -= lr * bias_grad;
    }
}

/// Affine transform: y = x·W + b with the scalar bias broadcast over the
/// whole output tensor.
pub fn affine_forward(x: &Array2<f64>, w: &Array2<f64>, b: f64) -> Array2<f64> {
    x.dot(w) + b
}

/// Gradients of the affine transform.
///
/// Returns `(grad_x, grad_w, grad_b)` where `grad_x = upstream·Wᵗ`,
/// `grad_w = xᵗ·upstream` and `grad_b = Σ upstream` (sum-reduced to a scalar
/// to match the scalar bias).
pub fn affine_backward(
    x: &Array2<f64>,
    w: &Array2<f64>,
    upstream: &Array2<f64>,
) -> (Array2<f64>, Array2<f64>, f64) {
    let grad_x = upstream.dot(&w.t());
    let grad_w = x.t().dot(upstream);
    let grad_b = upstream.sum();
    (grad_x, grad_w, grad_b)
}
