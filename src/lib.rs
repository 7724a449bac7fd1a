pub mod activation;
pub mod error;
pub mod layers;
pub mod loss;
pub mod network;
pub mod train;

// Convenience re-exports
pub use activation::Activation;
pub use error::{Error, Result};
pub use layers::Dense;
pub use loss::Loss;
pub use network::{
    ForwardPass, Gradients, HiddenActivation, Initializer, ModelRecord, Network, NetworkSpec,
    Propagation,
};
pub use train::{train, TrainConfig, TrainOutcome, TrainReport};
