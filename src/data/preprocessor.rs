// ============================================================
// Layer 4 — Feature Preprocessor
// ============================================================
// Cleans and scales the phone features before they reach the
// classifier. Four column transforms, all following the same
// fit/transform contract (domain::traits::Transformer):
//
//   ModeImputer        NaN        → most frequent value
//   OutlierCapper      < q_low    → q_low quantile
//                      > q_high   → q_high quantile
//   FixedValueImputer  invalid    → fixed sentinel
//   StandardScaler     x          → (x - mean) / std
//
// Fitted parameters are plain serde structs so the whole
// Preprocessor is stored inside the model artifact and the
// prediction service applies exactly what training learned.
//
// Steps are applied in this order:
//
//   raw table
//       │
//       ▼
//   cleaning: ModeImputer → OutlierCapper → FixedValueImputer
//       │                                   (this is the cleaned CSV)
//       ▼
//   StandardScaler
//       │
//       ▼
//   model input
//
// Reference: Rust Book §8 (Vectors), §10 (Traits)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::error::PipelineError;
use crate::domain::record::{BINARY_FEATURES, FEATURE_NAMES};
use crate::domain::table::Table;
use crate::domain::traits::Transformer;

/// Minimum plausible pixel height; smaller readings are data-entry errors
pub const PX_HEIGHT_FLOOR: f64 = 217.0;
/// Minimum plausible screen width in cm
pub const SC_W_FLOOR: f64 = 2.5;

// ─── ModeImputer ──────────────────────────────────────────────────────────────
/// Replaces missing values with the most frequent observed value.
/// Ties go to the smallest value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeImputer {
    columns: Vec<String>,
    modes:   Option<Vec<f64>>,
}

impl ModeImputer {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self { columns: columns.into_iter().map(Into::into).collect(), modes: None }
    }

    #[cfg(test)]
    pub fn modes(&self) -> Option<&[f64]> {
        self.modes.as_deref()
    }
}

fn mode(values: &[f64]) -> Option<f64> {
    // Keyed on the bit pattern: f64 is not Hash
    let mut counts: HashMap<u64, (f64, usize)> = HashMap::new();
    for &v in values.iter().filter(|v| !v.is_nan()) {
        // Fold -0.0 into 0.0 so they count as one value
        let v = if v == 0.0 { 0.0 } else { v };
        counts.entry(v.to_bits()).or_insert((v, 0)).1 += 1;
    }
    counts
        .into_values()
        .max_by(|(va, ca), (vb, cb)| ca.cmp(cb).then(vb.total_cmp(va)))
        .map(|(v, _)| v)
}

impl Transformer for ModeImputer {
    fn fit(&mut self, table: &Table) -> Result<(), PipelineError> {
        let mut modes = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let m = mode(table.column(name)?)
                .ok_or_else(|| PipelineError::EmptyColumn(name.clone()))?;
            modes.push(m);
        }
        self.modes = Some(modes);
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table, PipelineError> {
        let modes = self.modes.as_ref().ok_or(PipelineError::NotFitted("ModeImputer"))?;
        table.require_columns(&self.columns)?;

        let mut out = table.clone();
        for (name, &fill) in self.columns.iter().zip(modes) {
            for v in out.column_mut(name)?.iter_mut().filter(|v| v.is_nan()) {
                *v = fill;
            }
        }
        Ok(out)
    }
}

// ─── OutlierCapper ────────────────────────────────────────────────────────────
/// Clips each configured column to its fitted `[lower, upper]`
/// quantile bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierCapper {
    columns:        Vec<String>,
    lower_quantile: f64,
    upper_quantile: f64,
    bounds:         Option<Vec<Bounds>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl OutlierCapper {
    /// Fails with `InvalidQuantiles` unless `0 <= lower <= upper <= 1` (NaN fails too).
    pub fn new<S: Into<String>>(
        columns:        impl IntoIterator<Item = S>,
        lower_quantile: f64,
        upper_quantile: f64,
    ) -> Result<Self, PipelineError> {
        let valid = (0.0..=1.0).contains(&lower_quantile)
            && (0.0..=1.0).contains(&upper_quantile)
            && lower_quantile <= upper_quantile;
        if !valid {
            return Err(PipelineError::InvalidQuantiles {
                lower: lower_quantile,
                upper: upper_quantile,
            });
        }
        Ok(Self {
            columns: columns.into_iter().map(Into::into).collect(),
            lower_quantile,
            upper_quantile,
            bounds: None,
        })
    }

    /// Fitted bounds for a column, if it is configured and fitted
    #[cfg(test)]
    pub fn bounds_for(&self, column: &str) -> Option<Bounds> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.bounds.as_ref().map(|b| b[idx])
    }
}

/// Quantile with linear interpolation between order statistics.
/// `sorted` must be ascending and free of NaN.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos  = q * (sorted.len() - 1) as f64;
    let lo   = pos.floor() as usize;
    let hi   = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

impl Transformer for OutlierCapper {
    fn fit(&mut self, table: &Table) -> Result<(), PipelineError> {
        let mut bounds = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let mut sorted: Vec<f64> = table
                .column(name)?
                .iter()
                .copied()
                .filter(|v| !v.is_nan())
                .collect();
            if sorted.is_empty() {
                return Err(PipelineError::EmptyColumn(name.clone()));
            }
            sorted.sort_by(f64::total_cmp);
            bounds.push(Bounds {
                lower: quantile(&sorted, self.lower_quantile),
                upper: quantile(&sorted, self.upper_quantile),
            });
        }
        self.bounds = Some(bounds);
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table, PipelineError> {
        let bounds = self.bounds.as_ref().ok_or(PipelineError::NotFitted("OutlierCapper"))?;
        table.require_columns(&self.columns)?;

        let mut out = table.clone();
        for (name, b) in self.columns.iter().zip(bounds) {
            for v in out.column_mut(name)?.iter_mut().filter(|v| !v.is_nan()) {
                *v = v.clamp(b.lower, b.upper);
            }
        }
        Ok(out)
    }
}

// ─── FixedValueImputer ────────────────────────────────────────────────────────
/// What makes a value invalid for a FixRule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ValidityCheck {
    /// Strictly below the threshold
    Below(f64),
    /// Exactly equal to a marker value such as 0 or -1
    Equals(f64),
    /// NaN
    Missing,
}

impl ValidityCheck {
    fn is_invalid(&self, v: f64) -> bool {
        match *self {
            ValidityCheck::Below(t)  => v < t,
            ValidityCheck::Equals(m) => v == m,
            ValidityCheck::Missing   => v.is_nan(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixRule {
    pub column: String,
    pub check:  ValidityCheck,
    pub fill:   f64,
}

impl FixRule {
    pub fn new(column: impl Into<String>, check: ValidityCheck, fill: f64) -> Self {
        Self { column: column.into(), check, fill }
    }
}

/// Replaces invalid values with a fixed sentinel. Nothing is
/// learned from data, so `fit` only checks the columns exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedValueImputer {
    rules: Vec<FixRule>,
}

impl FixedValueImputer {
    pub fn new(rules: Vec<FixRule>) -> Self {
        Self { rules }
    }

    /// `px_height < 217 → 217`, `sc_w < 2.5 → 2.5`
    pub fn mobile_defaults() -> Self {
        Self::new(vec![
            FixRule::new("px_height", ValidityCheck::Below(PX_HEIGHT_FLOOR), PX_HEIGHT_FLOOR),
            FixRule::new("sc_w", ValidityCheck::Below(SC_W_FLOOR), SC_W_FLOOR),
        ])
    }

    fn columns(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.column.as_str()).collect()
    }
}

impl Transformer for FixedValueImputer {
    fn fit(&mut self, table: &Table) -> Result<(), PipelineError> {
        table.require_columns(&self.columns())
    }

    fn transform(&self, table: &Table) -> Result<Table, PipelineError> {
        table.require_columns(&self.columns())?;

        let mut out = table.clone();
        for rule in &self.rules {
            for v in out.column_mut(&rule.column)?.iter_mut() {
                if rule.check.is_invalid(*v) {
                    *v = rule.fill;
                }
            }
        }
        Ok(out)
    }
}

// ─── StandardScaler ───────────────────────────────────────────────────────────
/// Centres each configured column on its mean and divides by the
/// population standard deviation. Constant columns keep std = 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    stats:   Option<Vec<ScaleStats>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleStats {
    pub mean: f64,
    pub std:  f64,
}

impl StandardScaler {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self { columns: columns.into_iter().map(Into::into).collect(), stats: None }
    }

    #[cfg(test)]
    pub fn stats(&self) -> Option<&[ScaleStats]> {
        self.stats.as_deref()
    }
}

impl Transformer for StandardScaler {
    fn fit(&mut self, table: &Table) -> Result<(), PipelineError> {
        let mut stats = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let values: Vec<f64> = table
                .column(name)?
                .iter()
                .copied()
                .filter(|v| !v.is_nan())
                .collect();
            if values.is_empty() {
                return Err(PipelineError::EmptyColumn(name.clone()));
            }
            let n    = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let var  = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std  = if var > 0.0 { var.sqrt() } else { 1.0 };
            stats.push(ScaleStats { mean, std });
        }
        self.stats = Some(stats);
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Table, PipelineError> {
        let stats = self.stats.as_ref().ok_or(PipelineError::NotFitted("StandardScaler"))?;
        table.require_columns(&self.columns)?;

        let mut out = table.clone();
        for (name, s) in self.columns.iter().zip(stats) {
            for v in out.column_mut(name)?.iter_mut() {
                *v = (*v - s.mean) / s.std;
            }
        }
        Ok(out)
    }
}

// ─── CleaningStep ─────────────────────────────────────────────────────────────
/// One step of the cleaning stage. An enum rather than a boxed
/// trait object so the fitted pipeline derives Serialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum CleaningStep {
    ImputeMode(ModeImputer),
    CapOutliers(OutlierCapper),
    FixValues(FixedValueImputer),
}

impl Transformer for CleaningStep {
    fn fit(&mut self, table: &Table) -> Result<(), PipelineError> {
        match self {
            CleaningStep::ImputeMode(t)  => t.fit(table),
            CleaningStep::CapOutliers(t) => t.fit(table),
            CleaningStep::FixValues(t)   => t.fit(table),
        }
    }

    fn transform(&self, table: &Table) -> Result<Table, PipelineError> {
        match self {
            CleaningStep::ImputeMode(t)  => t.transform(table),
            CleaningStep::CapOutliers(t) => t.transform(table),
            CleaningStep::FixValues(t)   => t.transform(table),
        }
    }
}

// ─── Preprocessor ─────────────────────────────────────────────────────────────
/// The full feature pipeline: cleaning steps, then scaling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    cleaning: Vec<CleaningStep>,
    scaler:   StandardScaler,
}

impl Preprocessor {
    pub fn new(cleaning: Vec<CleaningStep>, scaler: StandardScaler) -> Self {
        Self { cleaning, scaler }
    }

    /// Column groups of the mobile dataset:
    ///   - binary columns are only imputed
    ///   - px_height and sc_w get fixed floors instead of capping
    ///   - every other numeric column is quantile-capped
    ///   - every non-binary column is scaled
    pub fn for_mobile_dataset(lower_quantile: f64, upper_quantile: f64) -> Result<Self, PipelineError> {
        let fixed = FixedValueImputer::mobile_defaults();
        let fixed_cols = fixed.columns().into_iter().map(str::to_string).collect::<Vec<_>>();

        let numeric: Vec<&str> = FEATURE_NAMES
            .iter()
            .copied()
            .filter(|f| !BINARY_FEATURES.contains(f))
            .collect();
        let capped: Vec<&str> = numeric
            .iter()
            .copied()
            .filter(|f| !fixed_cols.iter().any(|c| c == f))
            .collect();

        Ok(Self::new(
            vec![
                CleaningStep::ImputeMode(ModeImputer::new(FEATURE_NAMES)),
                CleaningStep::CapOutliers(OutlierCapper::new(capped, lower_quantile, upper_quantile)?),
                CleaningStep::FixValues(fixed),
            ],
            StandardScaler::new(numeric),
        ))
    }

    /// Apply only the cleaning steps (imputation, capping, fixed values)
    pub fn clean(&self, table: &Table) -> Result<Table, PipelineError> {
        let mut current = table.clone();
        for step in &self.cleaning {
            current = step.transform(&current)?;
        }
        Ok(current)
    }
}

impl Transformer for Preprocessor {
    /// Each step is fitted on the output of the steps before it,
    /// so the scaler sees the cleaned distribution.
    fn fit(&mut self, table: &Table) -> Result<(), PipelineError> {
        let mut current = table.clone();
        for step in &mut self.cleaning {
            current = step.fit_transform(&current)?;
        }
        self.scaler.fit(&current)
    }

    fn transform(&self, table: &Table) -> Result<Table, PipelineError> {
        self.scaler.transform(&self.clean(table)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn one_to_hundred() -> Table {
        let values: Vec<f64> = (1..=100).map(f64::from).collect();
        Table::from_columns([("ram", values.clone()), ("other", values)]).unwrap()
    }

    #[test]
    fn test_quantile_interpolates() {
        let sorted: Vec<f64> = (1..=100).map(f64::from).collect();
        assert!((quantile(&sorted, 0.97) - 97.03).abs() < 1e-9);
        assert!((quantile(&sorted, 0.03) - 3.97).abs() < 1e-9);
        assert_eq!(quantile(&sorted, 0.0), 1.0);
        assert_eq!(quantile(&sorted, 1.0), 100.0);
    }

    #[test]
    fn test_capper_clips_to_exact_bound() {
        let mut capper = OutlierCapper::new(["ram"], 0.03, 0.97).unwrap();
        let out = capper.fit_transform(&one_to_hundred()).unwrap();
        let b = capper.bounds_for("ram").unwrap();
        let before = one_to_hundred();
        let original = before.column("ram").unwrap();
        let ram = out.column("ram").unwrap();

        for (&old, &new) in original.iter().zip(ram) {
            if old > b.upper {
                assert_eq!(new, b.upper);
            } else if old < b.lower {
                assert_eq!(new, b.lower);
            } else {
                assert_eq!(new, old);
            }
        }
        assert_eq!(ram[99], b.upper);
        assert_eq!(ram[0], b.lower);
        // Unconfigured columns are untouched
        assert_eq!(out.column("other").unwrap(), original);
    }

    #[test]
    fn test_capper_reuses_fitted_bounds_on_new_data() {
        let mut capper = OutlierCapper::new(["ram"], 0.03, 0.97).unwrap();
        capper.fit(&one_to_hundred()).unwrap();

        let fresh = Table::from_columns([("ram", vec![-500.0, 50.0, 10_000.0])]).unwrap();
        let out = capper.transform(&fresh).unwrap();
        let b = capper.bounds_for("ram").unwrap();
        assert_eq!(out.column("ram").unwrap(), &[b.lower, 50.0, b.upper]);
    }

    #[test]
    fn test_capper_missing_column_fails() {
        let mut capper = OutlierCapper::new(["battery_power"], 0.03, 0.97).unwrap();
        let err = capper.fit(&one_to_hundred()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn(c) if c == "battery_power"));

        let mut fitted = OutlierCapper::new(["ram"], 0.03, 0.97).unwrap();
        fitted.fit(&one_to_hundred()).unwrap();
        let no_ram = Table::from_columns([("other", vec![1.0])]).unwrap();
        assert!(matches!(fitted.transform(&no_ram), Err(PipelineError::MissingColumn(_))));
    }

    #[test]
    fn test_transform_before_fit_fails() {
        let capper = OutlierCapper::new(["ram"], 0.03, 0.97).unwrap();
        assert!(matches!(
            capper.transform(&one_to_hundred()),
            Err(PipelineError::NotFitted("OutlierCapper"))
        ));
    }

    #[test]
    fn test_invalid_quantiles_rejected() {
        for (lo, hi) in [(0.9, 0.1), (-0.1, 0.5), (0.2, 1.5), (f64::NAN, 0.97)] {
            assert!(matches!(
                OutlierCapper::new(["ram"], lo, hi),
                Err(PipelineError::InvalidQuantiles { .. })
            ));
        }
        assert!(Preprocessor::for_mobile_dataset(0.97, 0.03).is_err());
    }

    #[test]
    fn test_fixed_value_replaces_marker_only() {
        let t = Table::from_columns([("sc_w", vec![-1.0, 3.0, -1.0, 0.0, f64::NAN])]).unwrap();
        let imputer = FixedValueImputer::new(vec![FixRule::new("sc_w", ValidityCheck::Equals(-1.0), 2.5)]);
        let out = imputer.transform(&t).unwrap();
        let v = out.column("sc_w").unwrap();
        assert_eq!(&v[..4], &[2.5, 3.0, 2.5, 0.0]);
        assert!(v[4].is_nan());
    }

    #[test]
    fn test_mobile_default_floors() {
        let t = Table::from_columns([
            ("px_height", vec![0.0, 216.9, 217.0, 1200.0]),
            ("sc_w",      vec![0.0, 2.5, 7.0, 1.0]),
        ])
        .unwrap();
        let mut imputer = FixedValueImputer::mobile_defaults();
        let out = imputer.fit_transform(&t).unwrap();
        assert_eq!(out.column("px_height").unwrap(), &[217.0, 217.0, 217.0, 1200.0]);
        assert_eq!(out.column("sc_w").unwrap(), &[2.5, 2.5, 7.0, 2.5]);
    }

    #[test]
    fn test_fixed_value_missing_column_fails() {
        let t = Table::from_columns([("ram", vec![1.0])]).unwrap();
        let mut imputer = FixedValueImputer::mobile_defaults();
        assert!(matches!(imputer.fit(&t), Err(PipelineError::MissingColumn(c)) if c == "px_height"));
    }

    #[test]
    fn test_mode_imputer_fills_nan_with_smallest_mode() {
        let t = Table::from_columns([("fc", vec![3.0, 1.0, f64::NAN, 3.0, 1.0, 5.0])]).unwrap();
        let mut imputer = ModeImputer::new(["fc"]);
        let out = imputer.fit_transform(&t).unwrap();
        assert_eq!(imputer.modes().unwrap(), &[1.0]);
        assert_eq!(out.column("fc").unwrap()[2], 1.0);
    }

    #[test]
    fn test_mode_imputer_all_missing_fails() {
        let t = Table::from_columns([("fc", vec![f64::NAN, f64::NAN])]).unwrap();
        let mut imputer = ModeImputer::new(["fc"]);
        assert!(matches!(imputer.fit(&t), Err(PipelineError::EmptyColumn(_))));
    }

    #[test]
    fn test_scaler_standardises() {
        let t = Table::from_columns([("x", vec![1.0, 3.0]), ("k", vec![4.0, 4.0])]).unwrap();
        let mut scaler = StandardScaler::new(["x", "k"]);
        let out = scaler.fit_transform(&t).unwrap();
        assert_eq!(out.column("x").unwrap(), &[-1.0, 1.0]);
        // Constant column: std falls back to 1
        assert_eq!(out.column("k").unwrap(), &[0.0, 0.0]);
        assert_eq!(scaler.stats().unwrap()[0].mean, 2.0);
    }

    #[test]
    fn test_preprocessor_survives_serde() {
        let mut table = Table::new();
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            let values = (0..50).map(|r| ((r * (i + 3)) % 41) as f64).collect();
            table.push_column(*name, values).unwrap();
        }
        let mut pre = Preprocessor::for_mobile_dataset(0.03, 0.97).unwrap();
        let direct = pre.fit_transform(&table).unwrap();

        let json = serde_json::to_string(&pre).unwrap();
        let restored: Preprocessor = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.transform(&table).unwrap(), direct);
    }

    #[test]
    fn test_clean_leaves_label_and_binaries_unscaled() {
        let mut table = Table::new();
        for name in FEATURE_NAMES {
            table.push_column(name, vec![0.0, 1.0, 1.0, f64::NAN]).unwrap();
        }
        table.push_column("price_range", vec![0.0, 1.0, 2.0, 3.0]).unwrap();

        let mut pre = Preprocessor::for_mobile_dataset(0.03, 0.97).unwrap();
        pre.fit(&table).unwrap();
        let cleaned = pre.clean(&table).unwrap();

        assert_eq!(cleaned.column("wifi").unwrap(), &[0.0, 1.0, 1.0, 1.0]);
        assert_eq!(cleaned.column("px_height").unwrap(), &[217.0; 4]);
        assert_eq!(cleaned.column("price_range").unwrap(), &[0.0, 1.0, 2.0, 3.0]);

        let scaled = pre.transform(&table).unwrap();
        assert_eq!(scaled.column("wifi").unwrap(), &[0.0, 1.0, 1.0, 1.0]);
        assert_eq!(scaled.column("price_range").unwrap(), &[0.0, 1.0, 2.0, 3.0]);
    }
}
