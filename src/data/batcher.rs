// ============================================================
// Layer 4 — Price Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<PriceSample>
// into tensors for one optimiser step.
//
// How batching works here:
//   Input:  N PriceSamples, each with F scaled features
//   Output: PriceBatch with
//             features [N, F]   float
//             targets  [N]      int (class index)
//             one_hot  [N, K]   float, 1.0 at the true class
//
// The one-hot matrix is what the hinge loss uses to pick out
// the score of the true class and to mask it from the margins.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::PriceSample;
use crate::domain::record::NUM_PRICE_RANGES;

/// A batch of phones ready for the SVM forward pass.
#[derive(Debug, Clone)]
pub struct PriceBatch<B: Backend> {
    /// Scaled features — shape: [batch_size, num_features]
    pub features: Tensor<B, 2>,

    /// True class per row — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,

    /// One-hot encoding of `targets` — shape: [batch_size, num_classes]
    pub one_hot: Tensor<B, 2>,
}

#[derive(Clone, Debug)]
pub struct PriceBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> PriceBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<PriceSample, PriceBatch<B>> for PriceBatcher<B> {
    fn batch(&self, items: Vec<PriceSample>) -> PriceBatch<B> {
        let batch_size   = items.len();
        let num_features = items.first().map_or(0, |s| s.features.len());

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();

        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let mut one_hot = vec![0.0f32; batch_size * NUM_PRICE_RANGES];
        for (row, s) in items.iter().enumerate() {
            one_hot[row * NUM_PRICE_RANGES + s.label] = 1.0;
        }

        let features = Tensor::<B, 2>::from_data(
            TensorData::new(flat, [batch_size, num_features]), &self.device,
        );
        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);
        let one_hot = Tensor::<B, 2>::from_data(
            TensorData::new(one_hot, [batch_size, NUM_PRICE_RANGES]), &self.device,
        );

        PriceBatch { features, targets, one_hot }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_one_hot() {
        let device  = Default::default();
        let batcher = PriceBatcher::<NdArray>::new(device);
        let batch   = batcher.batch(vec![
            PriceSample { features: vec![0.1, 0.2, 0.3], label: 2 },
            PriceSample { features: vec![0.4, 0.5, 0.6], label: 0 },
        ]);

        assert_eq!(batch.features.dims(), [2, 3]);
        assert_eq!(batch.targets.dims(), [2]);
        assert_eq!(batch.one_hot.dims(), [2, NUM_PRICE_RANGES]);

        let hot: Vec<f32> = batch.one_hot.into_data().iter::<f32>().collect();
        assert_eq!(hot, vec![0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    }
}
