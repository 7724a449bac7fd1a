//! Two-class toy classification with a softmax output and one-hot targets.
//! Pass a hidden activation name as the first argument (default: relu).

use manta_nn::{train, Activation, HiddenActivation, Network, NetworkSpec, TrainConfig};
use ndarray::arr2;

fn main() -> manta_nn::Result<()> {
    tracing_subscriber::fmt().init();

    let hidden: Activation = match std::env::args().nth(1) {
        Some(name) => name.parse()?,
        None => Activation::Relu,
    };

    // Two point clouds around (0, 0) and (3, 3).
    let x = arr2(&[
        [0.1, -0.2],
        [-0.3, 0.4],
        [0.2, 0.1],
        [2.8, 3.1],
        [3.2, 2.7],
        [2.9, 3.3],
    ]);
    let t = arr2(&[
        [1.0, 0.0],
        [1.0, 0.0],
        [1.0, 0.0],
        [0.0, 1.0],
        [0.0, 1.0],
        [0.0, 1.0],
    ]);

    let spec = NetworkSpec::new((1, 2), vec![4, 2], Activation::Softmax)
        .hidden(HiddenActivation::Uniform(hidden));
    let mut network = Network::new(spec)?;

    let config = TrainConfig::new(0.05, 2_000).save_log(true);
    let report = train(&mut network, &x, &t, &config)?;
    println!(
        "trained for {} steps, final error {:.6} ({:?})",
        report.steps, report.final_error, report.outcome
    );

    let y = network.predict(&x)?;
    for (input, probs) in x.outer_iter().zip(y.outer_iter()) {
        let class = if probs[0] > probs[1] { 0 } else { 1 };
        println!(
            "{:?} -> class {} (p = [{:.3}, {:.3}])",
            input.to_vec(),
            class,
            probs[0],
            probs[1]
        );
    }
    Ok(())
}
