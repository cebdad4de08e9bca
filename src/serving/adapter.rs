//! The host-facing classifier adapter: one-time `load`, per-request
//! `predict`.
//!
//! The hosting framework owns networking, batching, and scheduling; this
//! adapter is a pure request-to-response transformation over a read-only
//! model. Lifecycle is `unloaded -> loaded`, transitioned exactly once by
//! `load()`; `predict` is only valid once loaded.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ServingConfig;
use crate::error::{Result, ServeError};
use crate::ml::ClassifierArtifact;
use crate::serving::request::PredictRequest;
use crate::serving::resolver::ArtifactResolver;

/// Model metadata surfaced to the host's info endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub n_features: usize,
    pub n_classes: usize,
    pub classes: Vec<i64>,
    pub schema_version: u32,
}

/// Serving adapter for one serialized classifier.
pub struct ClassifierAdapter {
    model_name: String,
    resolver: Arc<dyn ArtifactResolver>,
    model: Option<ClassifierArtifact>,
}

impl ClassifierAdapter {
    /// Construct an unloaded adapter. The resolver is injected by the host's
    /// model-management layer.
    pub fn new<S: Into<String>>(model_name: S, resolver: Arc<dyn ArtifactResolver>) -> Self {
        Self {
            model_name: model_name.into(),
            resolver,
            model: None,
        }
    }

    /// Convenience constructor wiring the directory resolver from config.
    pub fn from_config(config: &ServingConfig) -> Self {
        Self::new(config.model.name.clone(), Arc::new(config.resolver()))
    }

    /// Load and validate the model artifact.
    ///
    /// Called exactly once by the host before it accepts traffic. A failed
    /// load leaves the adapter unloaded; the host must treat this as a
    /// start-up failure and never route requests to the instance.
    pub fn load(&mut self) -> Result<()> {
        if self.model.is_some() {
            return Err(ServeError::InvalidState(format!(
                "model '{}' is already loaded",
                self.model_name
            )));
        }

        let path = self.resolver.resolve(&self.model_name).inspect_err(|e| {
            warn!("Failed to resolve model '{}': {e}", self.model_name);
        })?;
        let artifact = ClassifierArtifact::from_file(&path).inspect_err(|e| {
            warn!("Failed to load model '{}': {e}", self.model_name);
        })?;

        info!(
            "Loaded model '{}' from {} ({} features, {} classes)",
            self.model_name,
            path.display(),
            artifact.n_features(),
            artifact.n_classes()
        );
        self.model = Some(artifact);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Generate predictions for a decoded request body.
    ///
    /// The body must carry `inputs` as a nested numeric array; the reply is
    /// one class label per input row, in row order. Takes `&self` and never
    /// mutates adapter state, so concurrent calls from host workers are
    /// safe once the model is loaded.
    pub fn predict(&self, body: &Value) -> Result<Vec<i64>> {
        let model = self.loaded_model()?;
        let request = PredictRequest::from_body(body)?;
        let features = request.to_matrix()?;
        let labels = model.predict(features.view())?;
        debug!(
            model = %self.model_name,
            rows = labels.len(),
            "predict served"
        );
        Ok(labels)
    }

    /// Metadata for the loaded model.
    pub fn info(&self) -> Result<ModelInfo> {
        let model = self.loaded_model()?;
        Ok(ModelInfo {
            name: self.model_name.clone(),
            n_features: model.n_features(),
            n_classes: model.n_classes(),
            classes: model.classes().to_vec(),
            schema_version: model.schema_version,
        })
    }

    fn loaded_model(&self) -> Result<&ClassifierArtifact> {
        self.model.as_ref().ok_or_else(|| {
            ServeError::InvalidState(format!(
                "model '{}' is not loaded; call load() first",
                self.model_name
            ))
        })
    }
}
