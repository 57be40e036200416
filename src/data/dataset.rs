use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;
use crate::domain::record::{PriceRange, LABEL_COLUMN};
use crate::domain::table::Table;

/// One preprocessed phone: scaled feature vector plus its label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSample {
    pub features: Vec<f32>,
    pub label:    usize,
}

#[derive(Debug, Clone)]
pub struct PriceDataset {
    samples: Vec<PriceSample>,
}

impl PriceDataset {
    #[cfg(test)]
    pub fn new(samples: Vec<PriceSample>) -> Self { Self { samples } }

    /// Build samples from a preprocessed table. Every label must be a
    /// whole number in 0..=3.
    pub fn from_table<S: AsRef<str>>(table: &Table, features: &[S]) -> Result<Self, PipelineError> {
        let matrix = table.to_matrix(features)?;
        let labels = table.column(LABEL_COLUMN)?;
        let width  = features.len();

        let samples = labels
            .iter()
            .enumerate()
            .map(|(row, &label)| {
                Ok(PriceSample {
                    features: matrix[row * width..(row + 1) * width].to_vec(),
                    label:    PriceRange::from_cell(label)?.index(),
                })
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;

        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[PriceSample] { &self.samples }
}

impl Dataset<PriceSample> for PriceDataset {
    fn get(&self, index: usize) -> Option<PriceSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_become_samples() {
        let t = Table::from_columns([
            ("a", vec![1.0, 2.0]),
            ("b", vec![3.0, 4.0]),
            ("price_range", vec![0.0, 3.0]),
        ])
        .unwrap();
        let ds = PriceDataset::from_table(&t, &["b", "a"]).unwrap();
        assert_eq!(ds.len(), 2);
        let s = ds.get(1).unwrap();
        assert_eq!(s.features, vec![4.0, 2.0]);
        assert_eq!(s.label, 3);
    }

    #[test]
    fn test_out_of_range_label_rejected() {
        let t = Table::from_columns([("a", vec![1.0]), ("price_range", vec![7.0])]).unwrap();
        assert!(matches!(
            PriceDataset::from_table(&t, &["a"]),
            Err(PipelineError::InvalidLabel(_))
        ));
    }
}
