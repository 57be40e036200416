// ============================================================
// Layer 6 — Model Store
// ============================================================
// Saves and restores the trained model as ONE JSON file.
//
// What the file holds (ModelArtifact):
//   1. feature_names   — input column order the model expects
//   2. preprocessor    — fitted imputer / capper / scaler params
//   3. svm             — weight matrix and bias per class
//   4. config          — the TrainConfig that produced it
//   5. report          — train/test accuracy and confusion matrix
//
// Keeping the preprocessing parameters in the same file as
// the weights means the prediction path can never pair a model
// with the wrong scaler.
//
// Writes go straight to the target path with fs::write. A retrain
// therefore replaces the file in place, and a reader racing with
// it can see a truncated or stale file; load() reports that as
// MalformedModel.
//
// Default location:
//   models_ml/
//     SVM_output.json   ← the artifact
//     metrics.csv       ← one row per training run
//
// Reference: Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::data::preprocessor::Preprocessor;
use crate::domain::error::PipelineError;
use crate::domain::record::{FEATURE_NAMES, NUM_PRICE_RANGES};
use crate::infra::metrics::EvaluationReport;
use crate::ml::model::SvmWeights;

/// Everything needed to turn a raw phone into a price range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub preprocessor:  Preprocessor,
    pub svm:           SvmWeights,
    pub config:        TrainConfig,
    pub report:        EvaluationReport,
}

/// Reads and writes the model artifact at a fixed path.
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Serialise the artifact and overwrite the model file.
    pub fn save(&self, artifact: &ModelArtifact) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create model directory '{}'", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(artifact)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to save model to '{}'", self.path.display()))?;

        tracing::info!("Saved model to '{}'", self.path.display());
        Ok(())
    }

    /// Load and sanity-check the artifact.
    pub fn load(&self) -> Result<ModelArtifact, PipelineError> {
        if !self.exists() {
            return Err(PipelineError::ModelNotFound(self.path.clone()));
        }

        let malformed = |reason: String| PipelineError::MalformedModel {
            path: self.path.clone(),
            reason,
        };

        let json = fs::read_to_string(&self.path).map_err(|e| malformed(e.to_string()))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&json).map_err(|e| malformed(e.to_string()))?;

        if artifact.feature_names != FEATURE_NAMES {
            return Err(malformed("feature names do not match the mobile schema".to_string()));
        }
        if artifact.svm.num_features != FEATURE_NAMES.len()
            || artifact.svm.num_classes != NUM_PRICE_RANGES
        {
            return Err(malformed(format!(
                "svm shape is {}x{}, expected {}x{}",
                artifact.svm.num_features,
                artifact.svm.num_classes,
                FEATURE_NAMES.len(),
                NUM_PRICE_RANGES
            )));
        }
        artifact.svm.check_shape().map_err(|e| malformed(e.to_string()))?;

        tracing::debug!("Loaded model from '{}'", self.path.display());
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ModelArtifact {
        let n = FEATURE_NAMES.len();
        ModelArtifact {
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            preprocessor:  Preprocessor::for_mobile_dataset(0.03, 0.97).unwrap(),
            svm: SvmWeights {
                num_features: n,
                num_classes:  NUM_PRICE_RANGES,
                weight: vec![0.25; n * NUM_PRICE_RANGES],
                bias:   vec![0.0; NUM_PRICE_RANGES],
            },
            config: TrainConfig::default(),
            report: EvaluationReport::from_predictions(&[], &[], &[], &[]),
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("models_ml/SVM_output.json"));
        store.save(&artifact()).unwrap();

        assert!(store.exists());
        let loaded = store.load().unwrap();
        assert_eq!(loaded.svm, artifact().svm);
        assert_eq!(loaded.config.c, 42.0);
    }

    #[test]
    fn test_missing_file_is_model_not_found() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("nope.json"));
        assert!(matches!(store.load(), Err(PipelineError::ModelNotFound(_))));
    }

    #[test]
    fn test_truncated_file_is_malformed() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("SVM_output.json");
        fs::write(&path, "{\"feature_names\": [").unwrap();
        assert!(matches!(ModelStore::new(&path).load(), Err(PipelineError::MalformedModel { .. })));
    }

    #[test]
    fn test_wrong_shape_is_malformed() {
        let dir   = tempfile::tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("m.json"));
        let mut bad = artifact();
        bad.svm.num_classes = 3;
        bad.svm.weight.truncate(FEATURE_NAMES.len() * 3);
        bad.svm.bias.truncate(3);
        store.save(&bad).unwrap();
        assert!(matches!(store.load(), Err(PipelineError::MalformedModel { .. })));
    }
}
