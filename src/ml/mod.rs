//! Classifier inference (CPU-only, deploy-safe).
//!
//! This module is intentionally dependency-light so artifacts can be served
//! 24/7 on small instances without GPU/toolchain complexity.

pub mod classifier;

pub use classifier::{
    Activation, ClassifierArtifact, ClassifierMeta, DenseLayer, SCHEMA_VERSION,
};
