// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Mini-batch training of the linear SVM with Burn's
// DataLoader and Adam, followed by an evaluation pass.
//
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on EvalBackend (NdArray)
//   - Evaluation runs on the whole train and test sets at once
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{ensure, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    data::{
        dataloader::{batcher::Batcher, DataLoaderBuilder},
        dataset::Dataset,
    },
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::data::{
    batcher::{PriceBatch, PriceBatcher},
    dataset::PriceDataset,
};
use crate::domain::record::NUM_PRICE_RANGES;
use crate::infra::metrics::{EpochMetrics, EvaluationReport};
use crate::ml::model::{LinearSvm, LinearSvmConfig, SvmWeights};

type TrainBackend = Autodiff<NdArray>;
type EvalBackend  = NdArray;

/// Optimiser and objective settings for one fit.
#[derive(Debug, Clone)]
pub struct SvmTrainingParams {
    pub c:          f64,
    pub epochs:     usize,
    pub batch_size: usize,
    pub lr:         f64,
    pub seed:       u64,
}

pub struct TrainingOutcome {
    pub weights: SvmWeights,
    pub history: Vec<EpochMetrics>,
    pub report:  EvaluationReport,
}

pub fn fit_svm(
    params:        &SvmTrainingParams,
    train_dataset: PriceDataset,
    test_dataset:  PriceDataset,
) -> Result<TrainingOutcome> {
    ensure!(train_dataset.len() > 0, "training set is empty");
    ensure!(params.batch_size > 0, "batch size must be positive");

    let device = NdArrayDevice::default();
    let num_features = train_dataset.samples()[0].features.len();
    let n_train      = train_dataset.len();

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: LinearSvm<TrainBackend> =
        LinearSvmConfig::new(num_features, NUM_PRICE_RANGES).init(&device);
    tracing::info!(
        "Fitting linear SVM: {} features, {} classes, C={}, {} samples",
        num_features, NUM_PRICE_RANGES, params.c, n_train
    );

    let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

    // Shuffled mini-batches; the shuffle seed keeps runs reproducible
    let train_batcher = PriceBatcher::<TrainBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(params.batch_size)
        .shuffle(params.seed)
        .num_workers(1)
        .build(train_dataset.clone());

    let mut history = Vec::with_capacity(params.epochs);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=params.epochs {
        let mut loss_sum = 0.0f64;
        let mut batches  = 0usize;
        let mut correct  = 0usize;
        let mut seen     = 0usize;

        for batch in train_loader.iter() {
            let PriceBatch { features, targets, one_hot } = batch;
            let (loss, scores) = model.forward_loss(features, one_hot, params.c, n_train);

            loss_sum += loss.clone().into_scalar().elem::<f64>();
            batches  += 1;

            let [rows, _] = scores.dims();
            let hits: i64 = scores
                .argmax(1)
                .reshape([rows])
                .equal(targets)
                .int()
                .sum()
                .into_scalar()
                .elem::<i64>();
            correct += hits as usize;
            seen    += rows;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(params.lr, model, grads);
        }

        let metrics = EpochMetrics::new(
            epoch,
            if batches > 0 { loss_sum / batches as f64 } else { f64::NAN },
            if seen > 0 { correct as f64 / seen as f64 } else { 0.0 },
        );
        if epoch == 1 || epoch % 10 == 0 || epoch == params.epochs {
            tracing::info!(
                "Epoch {:>3}/{} | loss={:.4} | train_acc={:.1}%",
                epoch, params.epochs, metrics.loss, metrics.train_accuracy * 100.0,
            );
        }
        history.push(metrics);
    }

    // ── Evaluation (EvalBackend — no autodiff overhead) ───────────────────────
    let model_valid = model.valid();
    let train_pred  = predict_dataset(&model_valid, &train_dataset, &device);
    let test_pred   = predict_dataset(&model_valid, &test_dataset, &device);

    let report = EvaluationReport::from_predictions(
        &labels_of(&train_dataset), &train_pred,
        &labels_of(&test_dataset),  &test_pred,
    );
    tracing::info!(
        "Training complete: train_acc={:.1}% test_acc={:.1}%",
        report.train_accuracy * 100.0,
        report.test_accuracy * 100.0,
    );

    Ok(TrainingOutcome { weights: model_valid.to_weights(), history, report })
}

fn labels_of(dataset: &PriceDataset) -> Vec<usize> {
    dataset.samples().iter().map(|s| s.label).collect()
}

fn predict_dataset(
    model:   &LinearSvm<EvalBackend>,
    dataset: &PriceDataset,
    device:  &NdArrayDevice,
) -> Vec<usize> {
    if dataset.len() == 0 {
        return Vec::new();
    }
    let batch = PriceBatcher::<EvalBackend>::new(device.clone()).batch(dataset.samples().to_vec());
    model
        .predict(batch.features)
        .into_data()
        .iter::<i64>()
        .map(|c| c as usize)
        .collect()
}
