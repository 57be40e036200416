// ============================================================
// Layer 6 — Metrics
// ============================================================
// Training metrics, kept two ways:
//   - EpochMetrics:     average loss and accuracy per epoch
//   - EvaluationReport: final train/test accuracy plus the
//                       test-set confusion matrix, embedded
//                       in the model artifact
//
// MetricsLogger appends one CSV row per training run to
// metrics.csv beside the model file, so retrains can be
// compared over time.
//
// Example CSV output:
//   epochs,final_loss,train_accuracy,test_accuracy,train_samples,test_samples
//   60,0.081234,0.978750,0.962500,1600,400
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::record::NUM_PRICE_RANGES;

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average hinge loss over the epoch's batches
    pub loss: f64,

    /// Fraction of training rows classified correctly during the epoch
    pub train_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, loss: f64, train_accuracy: f64) -> Self {
        Self { epoch, loss, train_accuracy }
    }
}

/// Accuracy after training. `confusion[actual][predicted]` counts test rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub train_accuracy: f64,
    pub test_accuracy:  f64,
    pub train_samples:  usize,
    pub test_samples:   usize,
    pub confusion:      Vec<Vec<usize>>,
}

impl EvaluationReport {
    pub fn from_predictions(
        train_actual: &[usize],
        train_pred:   &[usize],
        test_actual:  &[usize],
        test_pred:    &[usize],
    ) -> Self {
        let mut confusion = vec![vec![0usize; NUM_PRICE_RANGES]; NUM_PRICE_RANGES];
        for (&a, &p) in test_actual.iter().zip(test_pred) {
            if a < NUM_PRICE_RANGES && p < NUM_PRICE_RANGES {
                confusion[a][p] += 1;
            }
        }
        Self {
            train_accuracy: accuracy(train_actual, train_pred),
            test_accuracy:  accuracy(test_actual, test_pred),
            train_samples:  train_actual.len(),
            test_samples:   test_actual.len(),
            confusion,
        }
    }
}

/// Fraction of positions where the two slices agree; 0 for empty input
pub fn accuracy(actual: &[usize], predicted: &[usize]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let hits = actual.iter().zip(predicted).filter(|(a, p)| a == p).count();
    hits as f64 / actual.len() as f64
}

/// Appends one row per training run to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a logger writing `metrics.csv` in `dir`.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epochs,final_loss,train_accuracy,test_accuracy,train_samples,test_samples")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log_run(&self, history: &[EpochMetrics], report: &EvaluationReport) -> Result<()> {
        let final_loss = history.last().map_or(f64::NAN, |m| m.loss);

        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{},{}",
            history.len(),
            final_loss,
            report.train_accuracy,
            report.test_accuracy,
            report.train_samples,
            report.test_samples,
        )?;

        tracing::debug!(
            "Logged run metrics: final_loss={:.4}, test_accuracy={:.4}",
            final_loss,
            report.test_accuracy,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accuracy_and_confusion() {
        let r = EvaluationReport::from_predictions(&[0, 1, 2, 3], &[0, 1, 2, 2], &[1, 1, 3], &[1, 0, 3]);
        assert_eq!(r.train_accuracy, 0.75);
        assert!((r.test_accuracy - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(r.confusion[1][1], 1);
        assert_eq!(r.confusion[1][0], 1);
        assert_eq!(r.confusion[3][3], 1);
        assert_eq!(r.test_samples, 3);
    }

    #[test]
    fn test_empty_accuracy_is_zero() {
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_logger_appends_rows() {
        let dir = tempfile::tempdir().unwrap();
        let report = EvaluationReport::from_predictions(&[0], &[0], &[1], &[1]);
        let history = vec![EpochMetrics::new(1, 0.5, 1.0)];

        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log_run(&history, &report).unwrap();
        // A second logger on the same dir must not rewrite the header
        MetricsLogger::new(dir.path()).unwrap().log_run(&history, &report).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("epochs,"));
        assert_eq!(lines[1], "1,0.500000,1.000000,1.000000,1,1");
    }
}
