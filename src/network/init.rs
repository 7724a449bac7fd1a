use ndarray::Array2;
use ndarray_rand::rand_distr::{StandardNormal, Uniform};
use ndarray_rand::RandomExt;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::activation::Activation;
use crate::network::spec::HiddenActivation;

/// Weight initialization policy.
///
/// Whatever the weight policy, every bias is a single scalar drawn once from
/// a standard normal distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    /// U(0, 1).
    Uniform,
    /// N(0, 1).
    Normal,
    /// N(0, 1) scaled by 1/sqrt(fan_in·fan_out). Suits sigmoid layers.
    #[serde(alias = "xavier")]
    Xabier,
    /// N(0, 1) scaled by sqrt(2/fan_in). Suits ReLU layers, whose zeroing of
    /// half the inputs is compensated by the larger variance.
    He,
}

/// Resolves an `auto` initializer against the hidden activation choice.
///
/// Only a uniform sigmoid or ReLU hidden selection picks a matching scheme;
/// everything else (per-layer lists included) defaults to Xabier with a
/// notice.
pub(crate) fn resolve(choice: Option<Initializer>, hidden: &HiddenActivation) -> Initializer {
    match choice {
        Some(initializer) => initializer,
        None => match hidden {
            HiddenActivation::Uniform(Activation::Sigmoid) => Initializer::Xabier,
            HiddenActivation::Uniform(Activation::Relu) => Initializer::He,
            _ => {
                warn!("initializer defaulted to `xabier`");
                Initializer::Xabier
            }
        },
    }
}

impl Initializer {
    /// Draws one layer's weight matrix of shape `(fan_in, fan_out)`.
    pub(crate) fn weights<R: Rng>(&self, fan_in: usize, fan_out: usize, rng: &mut R) -> Array2<f64> {
        match self {
            Initializer::Uniform => {
                Array2::random_using((fan_in, fan_out), Uniform::new(0.0, 1.0), rng)
            }
            Initializer::Normal => {
                Array2::random_using((fan_in, fan_out), StandardNormal, rng)
            }
            Initializer::Xabier => {
                let scale = 1.0 / ((fan_in * fan_out) as f64).sqrt();
                Array2::<f64>::random_using((fan_in, fan_out), StandardNormal, rng) * scale
            }
            Initializer::He => {
                let scale = (2.0 / fan_in as f64).sqrt();
                Array2::<f64>::random_using((fan_in, fan_out), StandardNormal, rng) * scale
            }
        }
    }

    /// Draws one layer's scalar bias.
    pub(crate) fn bias<R: Rng>(rng: &mut R) -> f64 {
        rng.sample(StandardNormal)
    }
}
