use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::activation::Activation;
use crate::error::Error;
use crate::loss::{cross_entropy, mean_square};

/// Selects the scalar loss applied after the final activation.
///
/// - `MeanSquare`   — 0.5·Σ(y-t)² over the whole batch; pair with Identity,
///   ReLU or Sigmoid output.
/// - `CrossEntropy` — -Σ t·ln(y) divided by the batch size; pair with a
///   Softmax output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    MeanSquare,
    CrossEntropy,
}

impl Loss {
    /// The loss an `auto` configuration resolves to for a given output kind.
    pub fn auto_for(output: Activation) -> Loss {
        match output {
            Activation::Softmax => Loss::CrossEntropy,
            Activation::Sigmoid | Activation::Relu | Activation::Identity => Loss::MeanSquare,
        }
    }

    /// Scalar error for a batch of predictions.
    ///
    /// `y` is taken by value: cross-entropy patches exact zeros with `delta`
    /// before taking logs, so the prediction is consumed rather than shared.
    pub fn forward(&self, y: Array2<f64>, t: &Array2<f64>, batch_size: usize, delta: f64) -> f64 {
        match self {
            Loss::MeanSquare => mean_square::forward(&y, t),
            Loss::CrossEntropy => cross_entropy::forward(y, t, batch_size, delta),
        }
    }

    /// Gradient of the loss w.r.t. the prediction. Consumes `y` like
    /// [`Loss::forward`]. Not invoked on the softmax+cross-entropy shortcut
    /// path, which seeds the reverse pass with `y - t` directly.
    pub fn backward(&self, y: Array2<f64>, t: &Array2<f64>, delta: f64) -> Array2<f64> {
        match self {
            Loss::MeanSquare => mean_square::backward(&y, t),
            Loss::CrossEntropy => cross_entropy::backward(y, t, delta),
        }
    }
}

impl FromStr for Loss {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "mean_square" => Ok(Loss::MeanSquare),
            "cross_entropy" => Ok(Loss::CrossEntropy),
            other => Err(Error::UnsupportedLoss {
                name: other.to_string(),
            }),
        }
    }
}
