use std::path::Path;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::layers::Dense;
use crate::loss::Loss;
use crate::network::init::Initializer;
use crate::network::network::{Gradients, Network, Propagation};

/// The persisted form of a network.
///
/// The first block of fields is required; the rest are independently
/// optional, and a record missing any of them still loads. Weight tensors
/// serialize as nested row arrays, biases as a flat scalar sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    pub input_shape: (usize, usize),
    pub structure: Vec<usize>,
    pub strict: bool,
    pub initializer: Initializer,
    pub output: Activation,
    pub loss: Loss,
    pub activations: Vec<Activation>,
    pub delta: f64,
    pub w_layers: Vec<Vec<Vec<f64>>>,
    pub b_layers: Vec<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w_gradients: Option<Vec<Vec<Vec<f64>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b_gradients: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_ins: Option<Vec<Vec<Vec<f64>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fan_outs: Option<Vec<Vec<Vec<f64>>>>,
}

impl ModelRecord {
    /// Attaches the gradient set from a backward call.
    pub fn with_gradients(mut self, grads: &Gradients) -> Self {
        self.w_gradients = Some(grads.weights.iter().map(matrix_rows).collect());
        self.b_gradients = Some(grads.biases.clone());
        self
    }

    /// Attaches the cached per-layer tensors from a forward call. One
    /// `fan_ins` entry per layer (the input each layer received) and one
    /// `fan_outs` entry per layer (its pre-activation).
    pub fn with_propagation(mut self, propagation: &Propagation) -> Self {
        let layer_count = propagation.fan_outs.len();
        self.fan_ins = Some(
            propagation
                .fan_ins
                .iter()
                .take(layer_count)
                .map(matrix_rows)
                .collect(),
        );
        self.fan_outs = Some(propagation.fan_outs.iter().map(matrix_rows).collect());
        self
    }

    /// Serializes the record to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a record from a JSON file previously written by
    /// `save_json`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<ModelRecord> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Network {
    /// Snapshots the network into a record: configuration, weights, biases,
    /// and the error log when one has been collected. Gradient and
    /// propagation sections are call-scoped values, so the caller attaches
    /// them via [`ModelRecord::with_gradients`] /
    /// [`ModelRecord::with_propagation`] when wanted.
    pub fn to_record(&self) -> ModelRecord {
        ModelRecord {
            input_shape: self.input_shape,
            structure: self.structure.clone(),
            strict: self.strict,
            initializer: self.initializer,
            output: self.output,
            loss: self.loss,
            activations: self.activations(),
            delta: self.delta,
            w_layers: self.layers.iter().map(|l| matrix_rows(&l.weights)).collect(),
            b_layers: self.layers.iter().map(|l| l.bias).collect(),
            error_log: if self.error_log.is_empty() {
                None
            } else {
                Some(self.error_log.clone())
            },
            w_gradients: None,
            b_gradients: None,
            fan_ins: None,
            fan_outs: None,
        }
    }

    /// Rebuilds a network from a record.
    ///
    /// Required fields are validated for internal consistency (counts, shape
    /// chain, output kind); optional fields that are absent are simply
    /// skipped. A present error log is restored; gradient and propagation
    /// sections stay on the record, since they describe one past call rather
    /// than network state.
    pub fn from_record(record: ModelRecord) -> Result<Network> {
        let layer_count = record.structure.len();
        if layer_count == 0 {
            return Err(Error::Record("structure is empty".into()));
        }
        if record.activations.len() != layer_count {
            return Err(Error::Record(format!(
                "expected {} activation kinds, got {}",
                layer_count,
                record.activations.len()
            )));
        }
        if record.activations.last() != Some(&record.output) {
            return Err(Error::Record(
                "last activation kind does not match the output kind".into(),
            ));
        }
        if record.w_layers.len() != layer_count || record.b_layers.len() != layer_count {
            return Err(Error::Record(format!(
                "expected {} weight matrices and biases, got {} and {}",
                layer_count,
                record.w_layers.len(),
                record.b_layers.len()
            )));
        }
        if !(record.delta > 0.0) {
            return Err(Error::Record("delta must be positive".into()));
        }

        let mut layers = Vec::with_capacity(layer_count);
        let mut fan_in = record.input_shape.1;
        for (i, (rows, &bias)) in record.w_layers.iter().zip(&record.b_layers).enumerate() {
            let weights = rows_matrix(rows)
                .map_err(|reason| Error::Record(format!("w_layers[{i}]: {reason}")))?;
            if weights.nrows() != fan_in || weights.ncols() != record.structure[i] {
                return Err(Error::Record(format!(
                    "w_layers[{i}] has shape ({}, {}), expected ({}, {})",
                    weights.nrows(),
                    weights.ncols(),
                    fan_in,
                    record.structure[i]
                )));
            }
            layers.push(Dense::new(weights, bias, record.activations[i]));
            fan_in = record.structure[i];
        }

        Ok(Network {
            layers,
            input_shape: record.input_shape,
            structure: record.structure,
            output: record.output,
            loss: record.loss,
            initializer: record.initializer,
            strict: record.strict,
            delta: record.delta,
            error_log: record.error_log.unwrap_or_default(),
        })
    }
}

fn matrix_rows(m: &Array2<f64>) -> Vec<Vec<f64>> {
    m.outer_iter().map(|row| row.to_vec()).collect()
}

fn rows_matrix(rows: &[Vec<f64>]) -> std::result::Result<Array2<f64>, String> {
    let nrows = rows.len();
    let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
    if rows.iter().any(|r| r.len() != ncols) {
        return Err("rows have unequal lengths".into());
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((nrows, ncols), flat).map_err(|e| e.to_string())
}
