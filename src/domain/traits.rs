// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer programs against these traits, not
// against the concrete CSV loader, transformers or model:
//   - CsvLoader          implements RecordSource
//   - every preprocessing step implements Transformer
//   - PredictionService  implements PricePredictor
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

use crate::domain::error::PipelineError;
use crate::domain::record::{MobileFeatures, PriceRange};
use crate::domain::table::Table;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the training table.
pub trait RecordSource {
    /// Load every record, label column included.
    fn load_table(&self) -> Result<Table>;
}

// ─── Transformer ──────────────────────────────────────────────────────────────
/// Column transform with a fit/transform split.
///
/// `fit` only computes parameters from training data. `transform`
/// reuses those parameters on any table and never mutates the
/// input. Both fail with `MissingColumn` when a configured column
/// is absent.
pub trait Transformer {
    fn fit(&mut self, table: &Table) -> Result<(), PipelineError>;

    fn transform(&self, table: &Table) -> Result<Table, PipelineError>;

    fn fit_transform(&mut self, table: &Table) -> Result<Table, PipelineError> {
        self.fit(table)?;
        self.transform(table)
    }
}

// ─── PricePredictor ───────────────────────────────────────────────────────────
/// Any component that maps one phone to one price range.
pub trait PricePredictor {
    fn predict(&self, features: &MobileFeatures) -> Result<PriceRange>;
}
