use burn::{
    module::Param,
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::domain::error::PipelineError;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct LinearSvmConfig {
    pub num_features: usize,
    pub num_classes:  usize,
}

impl LinearSvmConfig {
    /// All-zero weights: the objective is convex, so starting at the
    /// origin makes training reproducible without seeding the backend.
    pub fn init<B: Backend>(&self, device: &B::Device) -> LinearSvm<B> {
        LinearSvm {
            weight: Param::from_tensor(Tensor::zeros([self.num_features, self.num_classes], device)),
            bias:   Param::from_tensor(Tensor::zeros([self.num_classes], device)),
        }
    }
}

/// Multiclass linear SVM: one weight column and one bias per class,
/// prediction is the arg-max score.
#[derive(Module, Debug)]
pub struct LinearSvm<B: Backend> {
    pub weight: Param<Tensor<B, 2>>,
    pub bias:   Param<Tensor<B, 1>>,
}

/// Plain weights as stored in the model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvmWeights {
    pub num_features: usize,
    pub num_classes:  usize,
    /// Row-major [num_features, num_classes]
    pub weight: Vec<f32>,
    pub bias:   Vec<f32>,
}

impl SvmWeights {
    pub fn check_shape(&self) -> Result<(), PipelineError> {
        let expected_weight = self.num_features * self.num_classes;
        if self.weight.len() != expected_weight {
            return Err(PipelineError::ColumnLengthMismatch {
                column:   "svm.weight".to_string(),
                expected: expected_weight,
                actual:   self.weight.len(),
            });
        }
        if self.bias.len() != self.num_classes {
            return Err(PipelineError::ColumnLengthMismatch {
                column:   "svm.bias".to_string(),
                expected: self.num_classes,
                actual:   self.bias.len(),
            });
        }
        Ok(())
    }
}

impl<B: Backend> LinearSvm<B> {
    /// features: [batch, num_features] → scores: [batch, num_classes]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        features.matmul(self.weight.val()) + self.bias.val().unsqueeze::<2>()
    }

    /// Weston–Watkins multiclass hinge loss plus L2 penalty.
    ///
    ///   loss = mean_i Σ_{k≠y_i} max(0, 1 + s_ik − s_iy)  +  ‖W‖² / (2·C·n)
    ///
    /// which is the usual `½‖W‖² + C·Σ hinge` objective divided by `C·n`.
    /// `one_hot` is [batch, num_classes]; `n_total` is the training-set size
    /// so the penalty keeps the same weight whatever the batch size.
    pub fn forward_loss(
        &self,
        features: Tensor<B, 2>,
        one_hot:  Tensor<B, 2>,
        c:        f64,
        n_total:  usize,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let scores = self.forward(features);

        // Score of the true class per row: [batch, 1]
        let true_score = (scores.clone() * one_hot.clone()).sum_dim(1);

        let margins = (scores.clone() - true_score)
            .add_scalar(1.0)
            .clamp_min(0.0);
        // The true class always contributes exactly 1; mask it out
        let margins = margins * one_hot.neg().add_scalar(1.0);

        let hinge = margins.sum_dim(1).mean();
        let penalty = self
            .weight
            .val()
            .powf_scalar(2.0)
            .sum()
            .div_scalar(2.0 * c * n_total.max(1) as f64);

        (hinge + penalty, scores)
    }

    /// Predicted class per row: [batch]
    pub fn predict(&self, features: Tensor<B, 2>) -> Tensor<B, 1, Int> {
        let scores = self.forward(features);
        let [batch, _] = scores.dims();
        scores.argmax(1).reshape([batch])
    }

    /// Copy the parameters out of the backend
    pub fn to_weights(&self) -> SvmWeights {
        let [num_features, num_classes] = self.weight.val().dims();
        SvmWeights {
            num_features,
            num_classes,
            weight: self.weight.val().into_data().iter::<f32>().collect(),
            bias:   self.bias.val().into_data().iter::<f32>().collect(),
        }
    }

    /// Rebuild a model from stored weights
    pub fn from_weights(weights: &SvmWeights, device: &B::Device) -> Result<Self, PipelineError> {
        weights.check_shape()?;
        let weight = Tensor::<B, 2>::from_data(
            TensorData::new(weights.weight.clone(), [weights.num_features, weights.num_classes]),
            device,
        );
        let bias = Tensor::<B, 1>::from_data(
            TensorData::new(weights.bias.clone(), [weights.num_classes]),
            device,
        );
        Ok(Self {
            weight: Param::from_tensor(weight),
            bias:   Param::from_tensor(bias),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type B = NdArray;

    fn features(values: Vec<f32>, rows: usize, cols: usize) -> Tensor<B, 2> {
        Tensor::from_data(TensorData::new(values, [rows, cols]), &Default::default())
    }

    #[test]
    fn test_zero_model_loss_is_num_classes_minus_one() {
        let model: LinearSvm<B> = LinearSvmConfig::new(2, 4).init(&Default::default());
        let x = features(vec![1.0, 2.0, -1.0, 0.5], 2, 2);
        let one_hot = features(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0], 2, 4);

        let (loss, scores) = model.forward_loss(x, one_hot, 42.0, 2);
        assert_eq!(scores.dims(), [2, 4]);
        // All scores equal: each wrong class contributes a margin of 1
        let loss: f32 = loss.into_scalar().elem();
        assert!((loss - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_weights_round_trip_through_backend() {
        let weights = SvmWeights {
            num_features: 2,
            num_classes:  3,
            weight: vec![1.0, 0.0, -1.0, 0.0, 2.0, 0.0],
            bias:   vec![0.0, 0.5, 0.0],
        };
        let model = LinearSvm::<B>::from_weights(&weights, &Default::default()).unwrap();
        assert_eq!(model.to_weights(), weights);

        // Row [3, 0] scores [3, 0.5, -3] → class 0; row [0, 1] → [0, 2.5, 0] → class 1
        let predicted: Vec<i64> = model
            .predict(features(vec![3.0, 0.0, 0.0, 1.0], 2, 2))
            .into_data()
            .iter::<i64>()
            .collect();
        assert_eq!(predicted, vec![0, 1]);
    }

    #[test]
    fn test_bad_shape_rejected() {
        let weights = SvmWeights { num_features: 2, num_classes: 2, weight: vec![1.0], bias: vec![0.0, 0.0] };
        assert!(LinearSvm::<B>::from_weights(&weights, &Default::default()).is_err());
    }
}
