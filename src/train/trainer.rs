use std::collections::VecDeque;
use std::time::Instant;

use ndarray::Array2;
use tracing::{info, warn};

use crate::error::Result;
use crate::network::Network;
use crate::train::report::{TrainOutcome, TrainReport};
use crate::train::train_config::TrainConfig;

/// Width of the sliding error window the stagnation check watches.
const STALL_WINDOW: usize = 5;

/// Runs plain gradient descent for `config.iterations` steps.
///
/// Each iteration: forward, backward, then `W -= lr·∇W`, `b -= lr·∇b` across
/// all layers at once. Two health checks run against that iteration's
/// pre-update gradients and errors:
///
/// 1. a layer whose weight gradient is entirely zero is logged; if it is the
///    output layer the session ends with [`TrainOutcome::DeadGradient`];
/// 2. five bit-identical errors in a row end the session with
///    [`TrainOutcome::Stagnated`].
///
/// Both are normal outcomes, not errors. Exhausting the budget returns
/// [`TrainOutcome::Completed`].
pub fn train(
    network: &mut Network,
    x: &Array2<f64>,
    t: &Array2<f64>,
    config: &TrainConfig,
) -> Result<TrainReport> {
    if config.flush_log {
        network.flush_error_log();
    }

    info!(
        learning_rate = config.learning_rate,
        iterations = config.iterations,
        "train session started"
    );

    let started = Instant::now();
    let stride = progress_stride(config.iterations);
    let mut recent: VecDeque<u64> = VecDeque::with_capacity(STALL_WINDOW);
    let mut final_error = f64::NAN;
    let mut steps = 0;

    for step in 1..=config.iterations {
        let pass = network.forward(x, t)?;
        let grads = network.backward(&pass, t);
        let error = pass.error;

        network.apply_gradients(&grads, config.learning_rate);

        if config.save_log {
            network.log_error(error);
        }
        final_error = error;
        steps = step;

        // Health check 1: dead gradients, on the pre-update gradient set.
        let mut output_layer_dead = false;
        for (i, w_grad) in grads.weights.iter().enumerate() {
            if w_grad.iter().all(|&g| g == 0.0) {
                warn!(layer = i + 1, step, error, "weight gradient is entirely zero");
                if i + 1 == grads.weights.len() {
                    output_layer_dead = true;
                }
            }
        }
        if output_layer_dead {
            info!(step, error, "session terminated: output layer gradient is zero");
            return Ok(TrainReport {
                outcome: TrainOutcome::DeadGradient,
                steps,
                final_error,
                elapsed: started.elapsed(),
            });
        }

        // Health check 2: stagnation over the recent error window.
        if recent.len() == STALL_WINDOW {
            recent.pop_front();
        }
        recent.push_back(error.to_bits());
        if recent.len() == STALL_WINDOW && recent.iter().all(|&bits| bits == recent[0]) {
            info!(
                step,
                error, "session terminated: no learning effect for recent 5 steps"
            );
            return Ok(TrainReport {
                outcome: TrainOutcome::Stagnated,
                steps,
                final_error,
                elapsed: started.elapsed(),
            });
        }

        if step % stride == 0 {
            info!(step, total = config.iterations, error, "training progress");
        }
    }

    info!(steps, error = final_error, "train session complete");
    Ok(TrainReport {
        outcome: TrainOutcome::Completed,
        steps,
        final_error,
        elapsed: started.elapsed(),
    })
}

fn progress_stride(iterations: usize) -> usize {
    (iterations / 20).max(1)
}
