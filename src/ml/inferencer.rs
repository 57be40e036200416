// ============================================================
// Layer 5 — Inferencer
// ============================================================
use anyhow::{ensure, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, NdArray},
    prelude::*,
};

use crate::domain::record::PriceRange;
use crate::ml::model::{LinearSvm, SvmWeights};

type InferBackend = NdArray;

pub struct Inferencer {
    model:        LinearSvm<InferBackend>,
    num_features: usize,
    device:       NdArrayDevice,
}

impl Inferencer {
    pub fn from_weights(weights: &SvmWeights) -> Result<Self> {
        let device = NdArrayDevice::default();
        let model  = LinearSvm::from_weights(weights, &device)?;
        tracing::debug!(
            "SVM ready: {} features, {} classes",
            weights.num_features, weights.num_classes
        );
        Ok(Self { model, num_features: weights.num_features, device })
    }

    /// `features` is row-major [rows, num_features], already preprocessed.
    pub fn predict(&self, features: Vec<f32>) -> Result<Vec<PriceRange>> {
        ensure!(
            features.len() % self.num_features == 0,
            "feature buffer of length {} is not a multiple of {}",
            features.len(),
            self.num_features
        );
        let rows = features.len() / self.num_features;
        if rows == 0 {
            return Ok(Vec::new());
        }

        let input = Tensor::<InferBackend, 2>::from_data(
            TensorData::new(features, [rows, self.num_features]),
            &self.device,
        );

        self.model
            .predict(input)
            .into_data()
            .iter::<i64>()
            .map(|class| Ok(PriceRange::new(class as usize)?))
            .collect()
    }
}
