// Training-loop behavior: error descent, early-termination conditions, and
// error-log lifecycle.

use manta_nn::{
    train, Activation, Loss, ModelRecord, Network, NetworkSpec, TrainConfig, TrainOutcome,
};
use ndarray::{arr2, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn separable_fixture() -> (Network, Array2<f64>, Array2<f64>) {
    let mut rng = StdRng::seed_from_u64(2024);
    let spec = NetworkSpec::new((1, 2), vec![2, 1], Activation::Sigmoid).loss(Loss::MeanSquare);
    let network = Network::with_rng(spec, &mut rng).unwrap();

    // Linearly separable two-class points: class by sign of the first feature.
    let x = arr2(&[
        [1.0, 0.2],
        [0.8, -0.3],
        [1.2, 0.5],
        [-1.0, 0.1],
        [-0.7, -0.4],
        [-1.3, 0.3],
    ]);
    let t = arr2(&[[1.0], [1.0], [1.0], [0.0], [0.0], [0.0]]);
    (network, x, t)
}

#[test]
fn error_descends_on_separable_data() {
    let (mut network, x, t) = separable_fixture();
    let config = TrainConfig::new(0.1, 100).save_log(true);
    let report = train(&mut network, &x, &t, &config).unwrap();

    assert_eq!(report.outcome, TrainOutcome::Completed);
    assert_eq!(report.steps, 100);

    let log = network.error_log();
    assert_eq!(log.len(), 100);
    assert!(
        log[99] < log[0],
        "error did not decrease: start {} end {}",
        log[0],
        log[99]
    );
}

#[test]
fn zero_learning_rate_stagnates_after_the_window_fills() {
    let (mut network, x, t) = separable_fixture();
    // No parameter movement, so every iteration reproduces the same error bits.
    let config = TrainConfig::new(0.0, 1_000).save_log(true);
    let report = train(&mut network, &x, &t, &config).unwrap();

    assert_eq!(report.outcome, TrainOutcome::Stagnated);
    assert_eq!(report.steps, 5);
    assert!(report.steps < config.iterations);
}

#[test]
fn dead_output_layer_gradient_terminates_immediately() {
    // A single ReLU layer whose pre-activation is negative everywhere has an
    // all-zero weight gradient, and it is the output layer.
    let record = ModelRecord {
        input_shape: (1, 1),
        structure: vec![1],
        strict: false,
        initializer: manta_nn::Initializer::Normal,
        output: Activation::Relu,
        loss: Loss::MeanSquare,
        activations: vec![Activation::Relu],
        delta: 1e-7,
        w_layers: vec![vec![vec![-1.0]]],
        b_layers: vec![0.0],
        error_log: None,
        w_gradients: None,
        b_gradients: None,
        fan_ins: None,
        fan_outs: None,
    };
    let mut network = Network::from_record(record).unwrap();

    let x = arr2(&[[1.0]]);
    let t = arr2(&[[1.0]]);
    let config = TrainConfig::new(0.1, 50);
    let report = train(&mut network, &x, &t, &config).unwrap();

    assert_eq!(report.outcome, TrainOutcome::DeadGradient);
    assert_eq!(report.steps, 1);
}

#[test]
fn error_log_flushes_by_default_and_continues_on_request() {
    let (mut network, x, t) = separable_fixture();

    let first = TrainConfig::new(0.1, 3).save_log(true);
    train(&mut network, &x, &t, &first).unwrap();
    assert_eq!(network.error_log().len(), 3);

    let continued = TrainConfig::new(0.1, 2).save_log(true).flush_log(false);
    train(&mut network, &x, &t, &continued).unwrap();
    assert_eq!(network.error_log().len(), 5);

    let fresh = TrainConfig::new(0.1, 2).save_log(true);
    train(&mut network, &x, &t, &fresh).unwrap();
    assert_eq!(network.error_log().len(), 2);

    // Logging off leaves the flushed log empty.
    let silent = TrainConfig::new(0.1, 2);
    train(&mut network, &x, &t, &silent).unwrap();
    assert!(network.error_log().is_empty());
}
