//! Typed inference request decoded from the host's JSON body.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ServeError};

/// A decoded inference request: `inputs` holds N sample rows of M features
/// each, row-major.
///
/// Shape compatibility with the loaded model is deliberately not checked
/// here; an incompatible width is the model's call to reject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub inputs: Vec<Vec<f64>>,
}

impl PredictRequest {
    pub fn new(inputs: Vec<Vec<f64>>) -> Self {
        Self { inputs }
    }

    /// Extract and validate the `inputs` field from a decoded request body.
    pub fn from_body(body: &Value) -> Result<Self> {
        let obj = body.as_object().ok_or_else(|| {
            ServeError::InvalidInput("request body must be a JSON object".to_string())
        })?;
        let raw = obj.get("inputs").ok_or_else(|| {
            ServeError::InvalidInput("missing required field: inputs".to_string())
        })?;
        let inputs: Vec<Vec<f64>> = serde_json::from_value(raw.clone()).map_err(|e| {
            ServeError::InvalidInput(format!("inputs is not a numeric matrix: {e}"))
        })?;
        Ok(Self { inputs })
    }

    pub fn n_rows(&self) -> usize {
        self.inputs.len()
    }

    /// Convert the nested rows into a dense feature matrix.
    ///
    /// Zero rows yield a 0x0 matrix (an empty prediction, not an error);
    /// ragged rows cannot form a dense matrix and are rejected.
    pub fn to_matrix(&self) -> Result<Array2<f64>> {
        if self.inputs.is_empty() {
            return Ok(Array2::zeros((0, 0)));
        }

        let cols = self.inputs[0].len();
        let mut data = Vec::with_capacity(self.inputs.len() * cols);
        for (i, row) in self.inputs.iter().enumerate() {
            if row.len() != cols {
                return Err(ServeError::InvalidInput(format!(
                    "ragged inputs: row {i} has {} values, row 0 has {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }

        Array2::from_shape_vec((self.inputs.len(), cols), data).map_err(|e| {
            ServeError::InvalidInput(format!("inputs do not form a dense matrix: {e}"))
        })
    }
}
