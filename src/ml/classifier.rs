//! Serialized classifier artifacts and their prediction routine.
//!
//! An artifact is a serde object graph persisted with `bincode`: a small
//! feed-forward classifier plus the label/feature metadata needed to serve
//! it. Decode-then-validate, so a corrupt or incompatible file is rejected
//! at load time instead of at first prediction.
//!
//! Design goals:
//! - Stable, deterministic, dependency-light.
//! - Explicit shape validation (fail fast, host treats it as start-up failure).

use chrono::{DateTime, Utc};
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, ServeError};

/// Current artifact schema version. Bump on incompatible layout changes.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Linear,
    Relu,
    Tanh,
    Sigmoid,
}

impl Default for Activation {
    fn default() -> Self {
        Self::Linear
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenseLayer {
    /// Weights shape: [out_dim][in_dim]
    pub weights: Vec<Vec<f64>>,
    /// Bias shape: [out_dim]
    pub bias: Vec<f64>,
    #[serde(default)]
    pub activation: Activation,
}

impl DenseLayer {
    fn in_dim(&self) -> usize {
        self.weights.first().map(|r| r.len()).unwrap_or(0)
    }

    fn out_dim(&self) -> usize {
        self.weights.len()
    }
}

/// Metadata carried alongside the weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierMeta {
    /// Model family tag ("linear", "dense", ...); informational only.
    pub model_kind: String,
    /// Label emitted when the corresponding output unit wins.
    pub classes: Vec<i64>,
    /// Expected feature count per input row.
    pub n_features: usize,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
}

/// A deserialized, validated classifier ready to serve predictions.
///
/// Immutable after load; every operation takes `&self`, so a loaded
/// artifact can be shared read-only across host worker threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub schema_version: u32,

    pub meta: ClassifierMeta,

    /// Optional z-score normalization applied before the first layer.
    #[serde(default)]
    pub input_mean: Option<Vec<f64>>,
    #[serde(default)]
    pub input_std: Option<Vec<f64>>,

    pub layers: Vec<DenseLayer>,
}

impl ClassifierArtifact {
    /// Decode and validate an artifact file.
    ///
    /// All failures (missing file, short read, undecodable bytes, invalid
    /// shapes) surface as [`ServeError::ArtifactLoad`] and are fatal to the
    /// owning adapter.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            ServeError::ArtifactLoad(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (artifact, _): (Self, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| ServeError::ArtifactLoad(format!("artifact decode failed: {e}")))?;
        artifact.validate().map_err(ServeError::ArtifactLoad)?;
        Ok(artifact)
    }

    /// Encode the artifact in the on-disk format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| ServeError::Internal(format!("artifact encode failed: {e}")))
    }

    /// Persist the artifact. Write side of [`ClassifierArtifact::from_file`];
    /// used by export tooling and test fixtures, never by the serving path.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(format!(
                "unsupported schema version {} (expected {SCHEMA_VERSION})",
                self.schema_version
            ));
        }
        if self.meta.n_features == 0 {
            return Err("n_features must be > 0".to_string());
        }
        if self.meta.classes.len() < 2 {
            return Err(format!(
                "classifier needs at least 2 classes, got {}",
                self.meta.classes.len()
            ));
        }
        if self.layers.is_empty() {
            return Err("layers must not be empty".to_string());
        }
        if let (Some(mean), Some(std)) = (&self.input_mean, &self.input_std) {
            if mean.len() != self.meta.n_features {
                return Err(format!(
                    "input_mean length {} != n_features {}",
                    mean.len(),
                    self.meta.n_features
                ));
            }
            if std.len() != self.meta.n_features {
                return Err(format!(
                    "input_std length {} != n_features {}",
                    std.len(),
                    self.meta.n_features
                ));
            }
            if std.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err("input_std must be finite and > 0".to_string());
            }
        } else if self.input_mean.is_some() || self.input_std.is_some() {
            return Err("input_mean and input_std must be provided together".to_string());
        }

        let mut expected_in = self.meta.n_features;
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.out_dim() == 0 {
                return Err(format!("layer[{idx}] out_dim must be > 0"));
            }
            if layer.bias.len() != layer.out_dim() {
                return Err(format!(
                    "layer[{idx}] bias len {} != out_dim {}",
                    layer.bias.len(),
                    layer.out_dim()
                ));
            }
            for (r, row) in layer.weights.iter().enumerate() {
                if row.len() != expected_in {
                    return Err(format!(
                        "layer[{idx}] weights row {r} len {} != expected in_dim {expected_in}",
                        row.len()
                    ));
                }
                if row.iter().any(|v| !v.is_finite()) {
                    return Err(format!("layer[{idx}] weights contain non-finite values"));
                }
            }
            if layer.bias.iter().any(|v| !v.is_finite()) {
                return Err(format!("layer[{idx}] bias contain non-finite values"));
            }
            expected_in = layer.out_dim();
        }

        if expected_in != self.meta.classes.len() {
            return Err(format!(
                "final layer out_dim {} != number of classes {}",
                expected_in,
                self.meta.classes.len()
            ));
        }
        Ok(())
    }

    pub fn n_features(&self) -> usize {
        self.meta.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.meta.classes.len()
    }

    pub fn classes(&self) -> &[i64] {
        &self.meta.classes
    }

    pub fn output_dim(&self) -> usize {
        self.layers.last().map(|l| l.out_dim()).unwrap_or(0)
    }

    /// Per-class decision scores for a single feature row.
    ///
    /// This is where feature-width compatibility is enforced: the adapter
    /// hands rows through untouched and lets the model reject mismatches.
    pub fn decision_scores(&self, row: ArrayView1<'_, f64>) -> Result<Vec<f64>> {
        if row.len() != self.meta.n_features {
            return Err(ServeError::Prediction(format!(
                "feature dim mismatch: got {}, expected {}",
                row.len(),
                self.meta.n_features
            )));
        }
        if let Some(col) = row.iter().position(|v| !v.is_finite()) {
            return Err(ServeError::Prediction(format!(
                "non-finite feature value at column {col}"
            )));
        }

        let mut x: Vec<f64> = row.to_vec();

        if let (Some(mean), Some(std)) = (&self.input_mean, &self.input_std) {
            for i in 0..x.len() {
                let denom = std[i].max(1e-12);
                x[i] = (x[i] - mean[i]) / denom;
            }
        }

        for layer in &self.layers {
            let out_dim = layer.out_dim();
            let in_dim = layer.in_dim();

            let mut y = vec![0.0_f64; out_dim];
            for o in 0..out_dim {
                let mut sum = layer.bias[o];
                // weights[o] is the o-th row (len = in_dim)
                let row = &layer.weights[o];
                debug_assert_eq!(row.len(), in_dim);
                for i in 0..in_dim {
                    sum += row[i] * x[i];
                }
                y[o] = apply_activation(sum, layer.activation);
            }
            x = y;
        }

        Ok(x)
    }

    /// Predicted class label for a single feature row (argmax over scores,
    /// first maximum wins on ties).
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<i64> {
        let scores = self.decision_scores(row)?;
        let mut best = 0usize;
        for (idx, score) in scores.iter().enumerate() {
            if *score > scores[best] {
                best = idx;
            }
        }
        Ok(self.meta.classes[best])
    }

    /// Predicted class labels for an N x M feature matrix, one label per
    /// row, in row order. A zero-row matrix yields an empty vector.
    pub fn predict(&self, features: ArrayView2<'_, f64>) -> Result<Vec<i64>> {
        let mut labels = Vec::with_capacity(features.nrows());
        for row in features.outer_iter() {
            labels.push(self.predict_row(row)?);
        }
        Ok(labels)
    }
}

fn apply_activation(x: f64, act: Activation) -> f64 {
    match act {
        Activation::Linear => x,
        Activation::Relu => x.max(0.0),
        Activation::Tanh => x.tanh(),
        Activation::Sigmoid => sigmoid(x),
    }
}

fn sigmoid(x: f64) -> f64 {
    // Numerically-stable sigmoid.
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}
