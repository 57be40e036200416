// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Four subcommands: `train`, `serve`, `predict`, `frontend`.
//
// Training flags are shared by `train` and `serve` (the API's
// /train-model endpoint reruns training with them), so they
// live in one flattened TrainArgs struct.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the training pipeline once and save the model
    Train(TrainArgs),

    /// Serve the prediction API
    Serve(ServeArgs),

    /// Predict the price range of one phone described in a JSON file
    Predict(PredictArgs),

    /// Serve the front-end gateway that relays to the API
    Frontend(FrontendArgs),
}

/// Paths and hyperparameters of a training run
#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Labelled source CSV
    #[arg(long, default_value = "data/train.csv")]
    pub data_path: String,

    /// Where the cleaned (unscaled) dataset is written
    #[arg(long, default_value = "data/processed/mobile_clean.csv")]
    pub cleaned_path: String,

    /// Model artifact path; metrics.csv is written beside it
    #[arg(long, default_value = "models_ml/SVM_output.json")]
    pub model_path: String,

    /// Seed for the train/test shuffle and batch order
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Fraction of rows used for training
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Lower quantile for outlier capping
    #[arg(long, default_value_t = 0.03)]
    pub lower_quantile: f64,

    /// Upper quantile for outlier capping
    #[arg(long, default_value_t = 0.97)]
    pub upper_quantile: f64,

    /// SVM regularisation: larger C means a weaker L2 penalty
    #[arg(long, default_value_t = 42.0)]
    pub c: f64,

    #[arg(long, default_value_t = 60)]
    pub epochs: usize,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 0.05)]
    pub lr: f64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:      a.data_path,
            cleaned_path:   a.cleaned_path,
            model_path:     a.model_path,
            seed:           a.seed,
            train_fraction: a.train_fraction,
            lower_quantile: a.lower_quantile,
            upper_quantile: a.upper_quantile,
            c:              a.c,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    #[command(flatten)]
    pub train: TrainArgs,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// JSON file with the twenty feature fields
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value = "models_ml/SVM_output.json")]
    pub model_path: String,
}

#[derive(Args, Debug)]
pub struct FrontendArgs {
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, default_value_t = 8001)]
    pub port: u16,

    /// Base URL of the prediction API
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    pub api_url: String,
}
