// ============================================================
// Layer 2 — Predict Use Case
// ============================================================
// Loads a saved model artifact once and maps phones to price
// ranges:
//
//   1. Reject non-finite feature values
//   2. Build a one-row table in schema order
//   3. Apply the fitted preprocessor (clean + scale)
//   4. Run the SVM via the Inferencer (Layer 5)

use anyhow::{Context, Result};
use std::path::Path;

use crate::data::preprocessor::Preprocessor;
use crate::domain::record::{MobileFeatures, PriceRange, FEATURE_NAMES};
use crate::domain::table::Table;
use crate::domain::traits::{PricePredictor, Transformer};
use crate::infra::{
    metrics::EvaluationReport,
    model_store::ModelStore,
};
use crate::ml::inferencer::Inferencer;

pub struct PredictionService {
    preprocessor: Preprocessor,
    inferencer:   Inferencer,
    report:       EvaluationReport,
}

impl PredictionService {
    /// Read the artifact at `path`. Fails with `PipelineError::ModelNotFound`
    /// or `PipelineError::MalformedModel` (inside the anyhow error).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let artifact   = ModelStore::new(path.as_ref()).load()?;
        let inferencer = Inferencer::from_weights(&artifact.svm)
            .context("Failed to rebuild the SVM from stored weights")?;

        tracing::debug!(
            "Prediction service ready (test accuracy {:.3})",
            artifact.report.test_accuracy
        );
        Ok(Self {
            preprocessor: artifact.preprocessor,
            inferencer,
            report:       artifact.report,
        })
    }

    /// Evaluation results recorded when the model was trained
    pub fn report(&self) -> &EvaluationReport {
        &self.report
    }

    fn to_table(phones: &[MobileFeatures]) -> Result<Table> {
        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(phones.len()); FEATURE_NAMES.len()];
        for phone in phones {
            phone.validate()?;
            for (column, value) in columns.iter_mut().zip(phone.to_vector()) {
                column.push(value);
            }
        }
        Ok(Table::from_columns(FEATURE_NAMES.iter().copied().zip(columns))?)
    }

    /// Predict a whole batch in one pass through the model
    pub fn predict_many(&self, phones: &[MobileFeatures]) -> Result<Vec<PriceRange>> {
        let raw    = Self::to_table(phones)?;
        let scaled = self.preprocessor.transform(&raw)?;
        let matrix = scaled.to_matrix(&FEATURE_NAMES)?;
        self.inferencer.predict(matrix)
    }
}

impl PricePredictor for PredictionService {
    fn predict(&self, features: &MobileFeatures) -> Result<PriceRange> {
        self.predict_many(std::slice::from_ref(features))?
            .pop()
            .context("model returned no prediction")
    }
}
