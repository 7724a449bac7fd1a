use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All failure modes of the engine.
///
/// Training anomalies (dead gradients, stagnation) are deliberately *not*
/// errors; they are reported as `TrainOutcome` statuses by the trainer.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid construction parameter. Construction never partially succeeds.
    #[error("configuration error: `{field}`: {reason}")]
    Configuration { field: &'static str, reason: String },

    /// Input row count is not a multiple of the declared rows per sample.
    #[error("input has {rows} rows, not a multiple of the declared {unit_rows} rows per sample")]
    ShapeMismatch { rows: usize, unit_rows: usize },

    /// An activation kind name that the engine does not know.
    #[error("unsupported activation kind `{name}`")]
    UnsupportedActivation { name: String },

    /// A loss kind name that the engine does not know.
    #[error("unsupported loss kind `{name}`")]
    UnsupportedLoss { name: String },

    /// A model record that parses as JSON but violates the record contract
    /// (missing required field consistency, ragged tensors, broken shape chain).
    #[error("malformed model record: {0}")]
    Record(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
