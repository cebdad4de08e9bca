//! End-to-end lifecycle tests: artifact on disk -> resolver -> load ->
//! predict, exercised the way a serving host drives the adapter.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;

use clfserve::{
    Activation, ClassifierAdapter, ClassifierArtifact, ClassifierMeta, DenseLayer,
    DirectoryResolver, ServeError, ServingConfig, SCHEMA_VERSION,
};

/// Per-class centroids of a small 3-class / 4-feature flower dataset.
const CENTROIDS: [[f64; 4]; 3] = [
    [5.0, 3.4, 1.5, 0.2],
    [5.9, 2.8, 4.3, 1.3],
    [6.6, 3.0, 5.6, 2.0],
];

/// A nearest-centroid classifier in linear form: score_k(x) = 2*c_k.x - |c_k|^2,
/// so argmax over scores picks the closest centroid.
fn flower_classifier() -> ClassifierArtifact {
    let weights = CENTROIDS
        .iter()
        .map(|c| c.iter().map(|v| 2.0 * v).collect())
        .collect();
    let bias = CENTROIDS
        .iter()
        .map(|c| -c.iter().map(|v| v * v).sum::<f64>())
        .collect();

    ClassifierArtifact {
        schema_version: SCHEMA_VERSION,
        meta: ClassifierMeta {
            model_kind: "linear".to_string(),
            classes: vec![0, 1, 2],
            n_features: 4,
            trained_at: None,
        },
        input_mean: None,
        input_std: None,
        layers: vec![DenseLayer {
            weights,
            bias,
            activation: Activation::Linear,
        }],
    }
}

fn artifact_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("clfserve-e2e-{tag}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create artifact dir");
    dir
}

fn loaded_adapter(tag: &str) -> ClassifierAdapter {
    let dir = artifact_dir(tag);
    flower_classifier()
        .save(dir.join("flowers.clf"))
        .expect("write artifact");

    let resolver = Arc::new(DirectoryResolver::new(dir, "clf"));
    let mut adapter = ClassifierAdapter::new("flowers", resolver);
    adapter.load().expect("load artifact");
    adapter
}

#[test]
fn known_sample_maps_to_its_known_class() {
    let adapter = loaded_adapter("known-sample");
    let labels = adapter
        .predict(&json!({"inputs": [[5.1, 3.5, 1.4, 0.2]]}))
        .unwrap();
    assert_eq!(labels, vec![0]);
}

#[test]
fn output_length_matches_input_rows() {
    let adapter = loaded_adapter("length");
    let labels = adapter
        .predict(&json!({"inputs": [
            [5.1, 3.5, 1.4, 0.2],
            [6.7, 3.0, 5.2, 2.3],
            [5.5, 2.5, 3.9, 1.1],
        ]}))
        .unwrap();
    assert_eq!(labels.len(), 3);
}

#[test]
fn row_order_is_preserved() {
    let adapter = loaded_adapter("order");
    let body = json!({"inputs": [
        [5.1, 3.5, 1.4, 0.2],
        [6.7, 3.0, 5.2, 2.3],
        [5.5, 2.5, 3.9, 1.1],
    ]});
    assert_eq!(adapter.predict(&body).unwrap(), vec![0, 2, 1]);

    let reversed = json!({"inputs": [
        [5.5, 2.5, 3.9, 1.1],
        [6.7, 3.0, 5.2, 2.3],
        [5.1, 3.5, 1.4, 0.2],
    ]});
    assert_eq!(adapter.predict(&reversed).unwrap(), vec![1, 2, 0]);
}

#[test]
fn predict_is_idempotent() {
    let adapter = loaded_adapter("idempotent");
    let body = json!({"inputs": [[6.7, 3.0, 5.2, 2.3], [5.1, 3.5, 1.4, 0.2]]});
    let first = adapter.predict(&body).unwrap();
    let second = adapter.predict(&body).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_inputs_yield_an_empty_sequence() {
    let adapter = loaded_adapter("empty");
    assert_eq!(adapter.predict(&json!({"inputs": []})).unwrap(), Vec::<i64>::new());
}

#[test]
fn missing_inputs_key_is_invalid_input() {
    let adapter = loaded_adapter("missing-key");
    let err = adapter.predict(&json!({})).unwrap_err();
    assert!(matches!(err, ServeError::InvalidInput(_)), "got {err:?}");
}

#[test]
fn wrong_feature_width_is_a_prediction_error() {
    let adapter = loaded_adapter("width");
    let err = adapter
        .predict(&json!({"inputs": [[5.1, 3.5, 1.4]]}))
        .unwrap_err();
    assert!(matches!(err, ServeError::Prediction(_)), "got {err:?}");
}

#[test]
fn missing_artifact_fails_load_and_blocks_predict() {
    let dir = artifact_dir("missing-artifact");
    let resolver = Arc::new(DirectoryResolver::new(dir, "clf"));
    let mut adapter = ClassifierAdapter::new("no-such-model", resolver);

    let err = adapter.load().unwrap_err();
    assert!(matches!(err, ServeError::ArtifactLoad(_)), "got {err:?}");
    assert!(!adapter.is_loaded());

    // The failed load must not leave a half-initialized adapter behind.
    assert!(matches!(
        adapter.predict(&json!({"inputs": [[5.1, 3.5, 1.4, 0.2]]})),
        Err(ServeError::InvalidState(_))
    ));
}

#[test]
fn corrupt_artifact_fails_load() {
    let dir = artifact_dir("corrupt-artifact");
    std::fs::write(dir.join("flowers.clf"), b"definitely not a model").unwrap();

    let resolver = Arc::new(DirectoryResolver::new(dir, "clf"));
    let mut adapter = ClassifierAdapter::new("flowers", resolver);

    assert!(matches!(
        adapter.load(),
        Err(ServeError::ArtifactLoad(_))
    ));
    assert!(!adapter.is_loaded());
}

#[test]
fn artifact_round_trip_preserves_predictions() {
    let dir = artifact_dir("round-trip");
    let path = dir.join("flowers.clf");
    let original = flower_classifier();
    original.save(&path).unwrap();

    let restored = ClassifierArtifact::from_file(&path).unwrap();
    let x = ndarray::array![[5.1, 3.5, 1.4, 0.2], [6.7, 3.0, 5.2, 2.3]];
    assert_eq!(
        original.predict(x.view()).unwrap(),
        restored.predict(x.view()).unwrap()
    );
}

#[test]
fn adapter_wires_up_from_config_files() {
    let artifacts = artifact_dir("config-artifacts");
    flower_classifier()
        .save(artifacts.join("flowers.clf"))
        .unwrap();

    let config_dir = artifact_dir("config-files");
    std::fs::write(
        config_dir.join("default.toml"),
        format!(
            "[model]\nname = \"flowers\"\nartifact_dir = \"{}\"\n",
            artifacts.display()
        ),
    )
    .unwrap();

    let config = ServingConfig::load_from(&config_dir).expect("load config");
    config.validate().expect("valid config");
    assert_eq!(config.model.extension, "clf");

    let mut adapter = ClassifierAdapter::from_config(&config);
    adapter.load().unwrap();

    let info = adapter.info().unwrap();
    assert_eq!(info.name, "flowers");
    assert_eq!(info.n_features, 4);
    assert_eq!(info.n_classes, 3);

    assert_eq!(
        adapter
            .predict(&json!({"inputs": [[5.1, 3.5, 1.4, 0.2]]}))
            .unwrap(),
        vec![0]
    );
}

#[test]
fn loaded_adapter_serves_concurrent_predicts() {
    let adapter = Arc::new(loaded_adapter("concurrent"));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let adapter = Arc::clone(&adapter);
            std::thread::spawn(move || {
                adapter
                    .predict(&json!({"inputs": [[5.1, 3.5, 1.4, 0.2], [6.7, 3.0, 5.2, 2.3]]}))
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), vec![0, 2]);
    }
}
