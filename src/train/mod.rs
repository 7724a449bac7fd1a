pub mod report;
pub mod train_config;
pub mod trainer;

pub use report::{TrainOutcome, TrainReport};
pub use train_config::TrainConfig;
pub use trainer::train;
