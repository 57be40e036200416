// ============================================================
// API Layer — HTTP service (axum)
// ============================================================
// Three routes over the application layer:
//
//   GET  /             — health greeting
//   POST /predict      — one phone in, "Predicted Price Range: [k]" out
//   POST /train-model  — rerun the training pipeline, report the result
//
// Training, model loading and inference are blocking work and
// run on tokio's blocking pool. /predict reads the model file on
// every request and nothing locks it, so a predict that overlaps
// a retrain can read a half-written file. That surfaces as a 400
// like any other prediction failure.

pub mod error;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::Method,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::application::{
    predict_use_case::PredictionService,
    train_use_case::{TrainConfig, TrainUseCase, TrainingSummary},
};
use crate::domain::record::{MobileFeatures, PriceRange};
use crate::domain::traits::PricePredictor;
pub use error::ApiError;

pub const HEALTH_MESSAGE: &str = "Mobile classifier is all ready to go!";
pub const TRAIN_SUCCESS_MESSAGE: &str = "Model training script executed successfully";

/// Shared by every handler. The model path lives in `train_config`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub train_config: TrainConfig,
}

// --- Route Handlers ---

async fn healthcheck_handler() -> Json<&'static str> {
    tracing::info!("{}", HEALTH_MESSAGE);
    Json(HEALTH_MESSAGE)
}

async fn predict_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MobileFeatures>, JsonRejection>,
) -> Result<Json<String>, ApiError> {
    let Json(features) = payload.map_err(|rejection| {
        tracing::error!("Error: {}", rejection.body_text());
        ApiError::InvalidPrediction(rejection.body_text())
    })?;

    let model_path = state.train_config.model_path.clone();
    let prediction = tokio::task::spawn_blocking(move || -> anyhow::Result<PriceRange> {
        PredictionService::load(&model_path)?.predict(&features)
    })
    .await?;

    match prediction {
        Ok(range) => {
            tracing::info!("Predicted result: [{}]", range);
            Ok(Json(format!("Predicted Price Range: [{range}]")))
        }
        Err(err) => {
            tracing::error!("Error: {:#}", err);
            Err(ApiError::InvalidPrediction(format!("{err:#}")))
        }
    }
}

/// Run a training job on the blocking pool. A failed or panicked job
/// both come back as `ApiError::Training`.
async fn run_training<F>(job: F) -> Result<TrainingSummary, ApiError>
where
    F: FnOnce() -> anyhow::Result<TrainingSummary> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|err| anyhow::anyhow!("training task failed: {err}"))
        .and_then(|result| result)
        .map_err(|err| {
            let err = ApiError::Training(format!("{err:#}"));
            tracing::error!("{}", err);
            err
        })
}

async fn train_model_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let config  = state.train_config.clone();
    let summary = run_training(move || TrainUseCase::new(config).execute()).await?;

    let response = json!({
        "message":       TRAIN_SUCCESS_MESSAGE,
        "response_text": summary.to_string(),
    });
    tracing::info!("Successfully ran training: {}", response);
    Ok(Json(response))
}

// --- Router ---

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(healthcheck_handler))
        .route("/predict", post(predict_handler))
        .route("/train-model", post(train_model_handler))
        .route("/train-model/", post(train_model_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub(crate) async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
