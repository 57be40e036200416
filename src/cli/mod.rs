// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application);
// the two servers live in the api and frontend modules.
//
//   1. `train`    — run the training pipeline once
//   2. `serve`    — run the prediction API
//   3. `predict`  — one-shot prediction from a JSON file
//   4. `frontend` — run the gateway in front of the API
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::{fs, net::SocketAddr};

use commands::{Commands, FrontendArgs, PredictArgs, ServeArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "mobilepc",
    version = "0.1.0",
    about = "Train a linear SVM on mobile phone specs and serve price-range predictions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch; the CLI only routes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Serve(args)    => run_serve(args),
            Commands::Predict(args)  => run_predict(args),
            Commands::Frontend(args) => run_frontend(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on '{}'", args.data_path);
    let summary = TrainUseCase::new(args.into()).execute()?;

    println!("{summary}");
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictionService;
    use crate::domain::record::MobileFeatures;
    use crate::domain::traits::PricePredictor;

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("Cannot read '{}'", args.input.display()))?;
    let features: MobileFeatures = serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not a valid phone record", args.input.display()))?;

    let service = PredictionService::load(&args.model_path)?;
    tracing::info!("Model test accuracy: {:.3}", service.report().test_accuracy);
    let range   = service.predict(&features)?;

    println!("Predicted Price Range: [{range}]");
    Ok(())
}

fn socket_addr(host: &str, port: u16) -> Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")
}

fn run_serve(args: ServeArgs) -> Result<()> {
    use crate::api::{run_server, AppState};

    let addr  = socket_addr(&args.host, args.port)?;
    let state = AppState { train_config: args.train.into() };
    tracing::info!("Serving model from '{}'", state.train_config.model_path);

    runtime()?.block_on(run_server(addr, state))
}

fn run_frontend(args: FrontendArgs) -> Result<()> {
    use crate::frontend::FrontendState;

    let addr = socket_addr(&args.host, args.port)?;
    tracing::info!("Relaying to API at {}", args.api_url);

    runtime()?.block_on(crate::frontend::run_frontend(addr, FrontendState::new(args.api_url)))
}
