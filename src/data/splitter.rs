// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Shuffles rows and splits them into two sets:
//   - Training set: used to fit the preprocessor and the SVM
//   - Test set:     used to report accuracy on unseen phones
//
// The source CSV is sorted by nothing in particular, but we
// still shuffle so both sets carry all four price ranges.
// The RNG is seeded from TrainConfig::seed, so the same CSV
// and seed always produce the same split and the same model.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::table::Table;

/// Shuffle `samples` with a seeded RNG and split into (train, test).
///
/// # Arguments
/// * `samples`        - All available samples (consumed by this function)
/// * `train_fraction` - Proportion for training, e.g. 0.8 = 80%
/// * `seed`           - RNG seed; identical seeds give identical splits
pub fn split_train_test<T>(mut samples: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    // e.g. 2000 rows * 0.8 = 1600 → first 1600 are training
    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(total);

    let test = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} test ({}% / {}%)",
        samples.len(),
        test.len(),
        (samples.len() * 100) / total.max(1),
        (test.len()    * 100) / total.max(1),
    );

    (samples, test)
}

/// Split a table by rows, keeping every column.
pub fn split_table(table: &Table, train_fraction: f64, seed: u64) -> (Table, Table) {
    let indices: Vec<usize> = (0..table.num_rows()).collect();
    let (train_idx, test_idx) = split_train_test(indices, train_fraction, seed);
    (table.select_rows(&train_idx), table.select_rows(&test_idx))
}
