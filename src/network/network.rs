use ndarray::Array2;
use rand::Rng;

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::layers::dense::{self, Dense};
use crate::loss::Loss;
use crate::network::init::{self, Initializer};
use crate::network::spec::NetworkSpec;

/// The tensors cached by one forward pass: `fan_outs[i]` is layer i's
/// pre-activation, `fan_ins[i]` is the input that layer i received
/// (`fan_ins[0]` is the original network input, `fan_ins[L]` the final
/// output).
#[derive(Debug, Clone)]
pub struct Propagation {
    pub fan_ins: Vec<Array2<f64>>,
    pub fan_outs: Vec<Array2<f64>>,
}

/// Everything one forward call produced. `backward` consumes this read-only;
/// pairing a pass with weights that were updated after it was computed is
/// the caller's responsibility.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    pub output: Array2<f64>,
    pub error: f64,
    pub batch_size: usize,
    pub propagation: Propagation,
}

/// Per-layer parameter gradients in forward layer order.
#[derive(Debug, Clone)]
pub struct Gradients {
    pub weights: Vec<Array2<f64>>,
    pub biases: Vec<f64>,
}

/// A fixed-topology feedforward network.
///
/// Construction draws all weights and biases once; afterwards the trainer's
/// update step is the only mutation path. Forward and backward are pure with
/// respect to the network: the propagation cache travels inside the returned
/// [`ForwardPass`] instead of living on the instance.
#[derive(Debug, Clone)]
pub struct Network {
    pub layers: Vec<Dense>,
    pub(crate) input_shape: (usize, usize),
    pub(crate) structure: Vec<usize>,
    pub(crate) output: Activation,
    pub(crate) loss: Loss,
    pub(crate) initializer: Initializer,
    pub(crate) strict: bool,
    pub(crate) delta: f64,
    pub(crate) error_log: Vec<f64>,
}

impl Network {
    /// Builds a network from a validated spec using the thread-local RNG.
    pub fn new(spec: NetworkSpec) -> Result<Network> {
        Self::with_rng(spec, &mut rand::thread_rng())
    }

    /// Builds a network drawing every parameter from the given RNG.
    pub fn with_rng<R: Rng>(spec: NetworkSpec, rng: &mut R) -> Result<Network> {
        spec.validate()?;

        let activations = spec.resolved_activations();
        let loss = spec.resolved_loss();
        let initializer = init::resolve(spec.initializer, &spec.hidden);

        let mut layers = Vec::with_capacity(spec.structure.len());
        let mut fan_in = spec.input_shape.1;
        for (&fan_out, &activation) in spec.structure.iter().zip(&activations) {
            let weights = initializer.weights(fan_in, fan_out, rng);
            let bias = Initializer::bias(rng);
            layers.push(Dense::new(weights, bias, activation));
            fan_in = fan_out;
        }

        Ok(Network {
            layers,
            input_shape: spec.input_shape,
            structure: spec.structure,
            output: spec.output,
            loss,
            initializer,
            strict: spec.strict,
            delta: spec.delta,
            error_log: Vec::new(),
        })
    }

    pub fn input_shape(&self) -> (usize, usize) {
        self.input_shape
    }

    pub fn structure(&self) -> &[usize] {
        &self.structure
    }

    pub fn output(&self) -> Activation {
        self.output
    }

    pub fn loss(&self) -> Loss {
        self.loss
    }

    pub fn initializer(&self) -> Initializer {
        self.initializer
    }

    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// One activation kind per layer, the last being the output kind.
    pub fn activations(&self) -> Vec<Activation> {
        self.layers.iter().map(|l| l.activation).collect()
    }

    /// Scalar errors recorded by training sessions that ran with logging on.
    pub fn error_log(&self) -> &[f64] {
        &self.error_log
    }

    pub(crate) fn log_error(&mut self, error: f64) {
        self.error_log.push(error);
    }

    pub(crate) fn flush_error_log(&mut self) {
        self.error_log.clear();
    }

    fn batch_size_of(&self, x: &Array2<f64>) -> Result<usize> {
        let unit_rows = self.input_shape.0;
        if x.nrows() % unit_rows != 0 {
            return Err(Error::ShapeMismatch {
                rows: x.nrows(),
                unit_rows,
            });
        }
        Ok(x.nrows() / unit_rows)
    }

    /// Full forward pass: affine + activation per layer, then the loss.
    ///
    /// Caches every pre- and post-activation tensor for the matching
    /// `backward` call and returns them inside the pass value.
    pub fn forward(&self, x: &Array2<f64>, t: &Array2<f64>) -> Result<ForwardPass> {
        let batch_size = self.batch_size_of(x)?;

        let mut fan_ins = Vec::with_capacity(self.layers.len() + 1);
        let mut fan_outs = Vec::with_capacity(self.layers.len());
        fan_ins.push(x.clone());

        let mut current = x.clone();
        for layer in &self.layers {
            let z = dense::affine_forward(&current, &layer.weights, layer.bias);
            let a = layer.activation.forward(&z, batch_size);
            fan_outs.push(z);
            fan_ins.push(a.clone());
            current = a;
        }

        let error = self.loss.forward(current.clone(), t, batch_size, self.delta);

        Ok(ForwardPass {
            output: current,
            error,
            batch_size,
            propagation: Propagation { fan_ins, fan_outs },
        })
    }

    /// Reverse chain rule over all layers.
    ///
    /// Seeds with the loss gradient, or, when the output is softmax with
    /// cross-entropy loss and `strict` is off, directly with `y - t`, which
    /// replaces both the explicit loss gradient and the output layer's
    /// softmax Jacobian. Gradients come back in forward layer order.
    pub fn backward(&self, pass: &ForwardPass, t: &Array2<f64>) -> Gradients {
        let cache = &pass.propagation;
        let last = self.layers.len() - 1;
        let shortcut =
            self.output == Activation::Softmax && self.loss == Loss::CrossEntropy && !self.strict;

        let mut upstream = if shortcut {
            &pass.output - t
        } else {
            self.loss.backward(pass.output.clone(), t, self.delta)
        };

        let mut weight_grads = Vec::with_capacity(self.layers.len());
        let mut bias_grads = Vec::with_capacity(self.layers.len());

        for i in (0..=last).rev() {
            let layer = &self.layers[i];
            let z = &cache.fan_outs[i];
            let a = &cache.fan_ins[i + 1];
            let x = &cache.fan_ins[i];

            // On the shortcut path the seed already is the gradient w.r.t.
            // the output layer's pre-activation.
            let delta_z = if shortcut && i == last {
                upstream
            } else {
                layer
                    .activation
                    .backward(z, a, &upstream, pass.batch_size)
            };

            let (grad_x, grad_w, grad_b) = dense::affine_backward(x, &layer.weights, &delta_z);
            weight_grads.push(grad_w);
            bias_grads.push(grad_b);
            upstream = grad_x;
        }

        weight_grads.reverse();
        bias_grads.reverse();
        Gradients {
            weights: weight_grads,
            biases: bias_grads,
        }
    }

    /// Inference-only forward pass: no cache, no loss.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let batch_size = self.batch_size_of(x)?;
        let mut current = x.clone();
        for layer in &self.layers {
            let z = dense::affine_forward(&current, &layer.weights, layer.bias);
            current = layer.activation.forward(&z, batch_size);
        }
        Ok(current)
    }

    /// Applies one gradient-descent step to every layer. The gradient set is
    /// complete before the first layer is touched, so the update is never
    /// partial.
    pub fn apply_gradients(&mut self, grads: &Gradients, learning_rate: f64) {
        for (layer, (w_grad, b_grad)) in self
            .layers
            .iter_mut()
            .zip(grads.weights.iter().zip(&grads.biases))
        {
            layer.apply_gradients(w_grad, *b_grad, learning_rate);
        }
    }
}
