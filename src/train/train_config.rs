/// Hyperparameters for one `train` session.
///
/// # Fields
/// - `learning_rate` — gradient-descent step size
/// - `iterations`    — full forward/backward/update cycles to run
/// - `save_log`      — append each iteration's scalar error to the network's
///                     error log
/// - `flush_log`     — clear the error log when the session starts; turn off
///                     to continue an earlier session's log
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub learning_rate: f64,
    pub iterations: usize,
    pub save_log: bool,
    pub flush_log: bool,
}

impl TrainConfig {
    pub fn new(learning_rate: f64, iterations: usize) -> Self {
        TrainConfig {
            learning_rate,
            iterations,
            save_log: false,
            flush_log: true,
        }
    }

    pub fn save_log(mut self, save_log: bool) -> Self {
        self.save_log = save_log;
        self
    }

    pub fn flush_log(mut self, flush_log: bool) -> Self {
        self.flush_log = flush_log;
        self
    }
}
