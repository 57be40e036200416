// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the raw CSV to tensor batches:
//
//   train.csv
//       │
//       ▼
//   CsvLoader         → reads the file into a Table
//       │
//       ▼
//   split_table       → seeded 80/20 train/test split
//       │
//       ▼
//   Preprocessor      → impute, cap outliers, fix values, scale
//       │               (cleaned table also written back as CSV)
//       ▼
//   PriceDataset      → implements Burn's Dataset trait
//       │
//       ▼
//   PriceBatcher      → stacks samples into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads the labelled CSV into a Table
pub mod loader;

/// Writes the cleaned Table back to CSV
pub mod writer;

/// Imputers, outlier capper, scaler and their composition
pub mod preprocessor;

/// Seeded train/test split
pub mod splitter;

/// Implements Burn's Dataset trait for preprocessed phones
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
