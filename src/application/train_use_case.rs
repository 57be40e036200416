// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the source CSV          (Layer 4 - data)
//   Step 2: Split train/test (seeded)    (Layer 4 - data)
//   Step 3: Fit the preprocessor         (Layer 4 - data)
//   Step 4: Write the cleaned dataset    (Layer 4 - data)
//   Step 5: Build datasets               (Layer 4 - data)
//   Step 6: Fit and evaluate the SVM     (Layer 5 - ml)
//   Step 7: Append run metrics           (Layer 6 - infra)
//   Step 8: Save the model artifact      (Layer 6 - infra)
//
// Used by both `mobilepc train` and `POST /train-model`.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path};

use crate::data::{
    dataset::PriceDataset,
    loader::CsvLoader,
    preprocessor::Preprocessor,
    splitter::split_table,
    writer::write_csv,
};
use crate::domain::record::FEATURE_NAMES;
use crate::domain::traits::{RecordSource, Transformer};
use crate::infra::{
    metrics::MetricsLogger,
    model_store::{ModelArtifact, ModelStore},
};
use crate::ml::trainer::{fit_svm, SvmTrainingParams};

// ─── Training Configuration ──────────────────────────────────────────────────
// Every setting for one training run. Embedded in the saved
// model so a prediction can be traced back to how it was trained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:      String,
    pub cleaned_path:   String,
    pub model_path:     String,
    pub seed:           u64,
    pub train_fraction: f64,
    pub lower_quantile: f64,
    pub upper_quantile: f64,
    pub c:              f64,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:      "data/train.csv".to_string(),
            cleaned_path:   "data/processed/mobile_clean.csv".to_string(),
            model_path:     "models_ml/SVM_output.json".to_string(),
            seed:           42,
            train_fraction: 0.8,
            lower_quantile: 0.03,
            upper_quantile: 0.97,
            c:              42.0,
            epochs:         60,
            batch_size:     64,
            lr:             0.05,
        }
    }
}

impl TrainConfig {
    fn svm_params(&self) -> SvmTrainingParams {
        SvmTrainingParams {
            c:          self.c,
            epochs:     self.epochs,
            batch_size: self.batch_size,
            lr:         self.lr,
            seed:       self.seed,
        }
    }
}

// ─── TrainingSummary ─────────────────────────────────────────────────────────
/// What a finished run reports back to the CLI and the API.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub total_records:  usize,
    pub train_samples:  usize,
    pub test_samples:   usize,
    pub epochs:         usize,
    pub final_loss:     f64,
    pub train_accuracy: f64,
    pub test_accuracy:  f64,
    pub cleaned_path:   String,
    pub model_path:     String,
}

impl fmt::Display for TrainingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trained on {} of {} records for {} epochs (final loss {:.4}). \
             Train accuracy {:.2}%, test accuracy {:.2}% on {} held-out records. \
             Cleaned data written to {}, model saved to {}",
            self.train_samples,
            self.total_records,
            self.epochs,
            self.final_loss,
            self.train_accuracy * 100.0,
            self.test_accuracy * 100.0,
            self.test_samples,
            self.cleaned_path,
            self.model_path,
        )
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingSummary> {
        let cfg = &self.config;
        ensure!(
            cfg.train_fraction > 0.0 && cfg.train_fraction < 1.0,
            "train fraction must be between 0 and 1, got {}",
            cfg.train_fraction
        );

        let mut preprocessor = Preprocessor::for_mobile_dataset(cfg.lower_quantile, cfg.upper_quantile)?;

        // ── Step 1: Load the labelled dataset ─────────────────────────────────
        let table = CsvLoader::new(&cfg.data_path).load_table()?;
        ensure!(table.num_rows() > 0, "dataset '{}' has no records", cfg.data_path);

        // ── Step 2: Seeded train/test split ───────────────────────────────────
        let (train_table, test_table) = split_table(&table, cfg.train_fraction, cfg.seed);
        tracing::info!(
            "Split: {} train, {} test",
            train_table.num_rows(),
            test_table.num_rows()
        );

        // ── Step 3: Fit preprocessing on the training rows only ──────────────
        let train_scaled = preprocessor
            .fit_transform(&train_table)
            .context("Failed to fit the preprocessor")?;
        let test_scaled = preprocessor.transform(&test_table)?;

        // ── Step 4: Cleaned copy of the whole dataset, unscaled ──────────────
        let cleaned = preprocessor.clean(&table)?;
        write_csv(&cleaned, Path::new(&cfg.cleaned_path))?;
        tracing::info!("Wrote cleaned dataset to '{}'", cfg.cleaned_path);

        // ── Step 5: Burn datasets ─────────────────────────────────────────────
        let train_dataset = PriceDataset::from_table(&train_scaled, &FEATURE_NAMES)?;
        let test_dataset  = PriceDataset::from_table(&test_scaled, &FEATURE_NAMES)?;

        // ── Step 6: Fit and evaluate (Layer 5) ────────────────────────────────
        let outcome = fit_svm(&cfg.svm_params(), train_dataset, test_dataset)?;

        // ── Step 7: One metrics row per run, beside the model ────────────────
        let model_path  = Path::new(&cfg.model_path);
        let metrics_dir = match model_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let metrics = MetricsLogger::new(metrics_dir)?;
        metrics.log_run(&outcome.history, &outcome.report)?;
        tracing::info!("Appended run metrics to '{}'", metrics.csv_path().display());

        // ── Step 8: Persist everything prediction needs ──────────────────────
        let final_loss = outcome.history.last().map_or(f64::NAN, |m| m.loss);
        let artifact = ModelArtifact {
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            preprocessor,
            svm:           outcome.weights,
            config:        cfg.clone(),
            report:        outcome.report,
        };
        ModelStore::new(model_path).save(&artifact)?;

        Ok(TrainingSummary {
            total_records:  table.num_rows(),
            train_samples:  artifact.report.train_samples,
            test_samples:   artifact.report.test_samples,
            epochs:         outcome.history.len(),
            final_loss,
            train_accuracy: artifact.report.train_accuracy,
            test_accuracy:  artifact.report.test_accuracy,
            cleaned_path:   cfg.cleaned_path.clone(),
            model_path:     cfg.model_path.clone(),
        })
    }
}
