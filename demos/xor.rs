use manta_nn::{train, Activation, Network, NetworkSpec, TrainConfig};
use ndarray::arr2;

fn main() -> manta_nn::Result<()> {
    tracing_subscriber::fmt().init();

    // One sample = one row of two features.
    let spec = NetworkSpec::new((1, 2), vec![2, 1], Activation::Sigmoid);
    let mut network = Network::new(spec)?;

    let x = arr2(&[
        [1.0, 0.0],
        [1.0, 1.0],
        [0.0, 1.0],
        [0.0, 0.0],
    ]);
    let t = arr2(&[[1.0], [0.0], [1.0], [0.0]]);

    let config = TrainConfig::new(0.5, 10_000).save_log(true);
    let report = train(&mut network, &x, &t, &config)?;
    println!(
        "trained for {} steps in {:?}, final error {:.6} ({:?})",
        report.steps, report.elapsed, report.final_error, report.outcome
    );

    let y = network.predict(&x)?;
    for (input, output) in x.outer_iter().zip(y.outer_iter()) {
        println!("{:?} -> {:.4}", input.to_vec(), output[0]);
    }
    Ok(())
}
