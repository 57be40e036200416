// ============================================================
// Front-end gateway
// ============================================================
// A second, thin axum service that sits in front of the API
// and relays requests to it with reqwest:
//
//   GET  /             — its own greeting
//   POST /classify     — body forwarded to <api>/predict,
//                        answered as {"response": <raw text>}
//   GET  /healthcheck  — relays GET <api>/
//
// Upstream status codes are not interpreted: a 400 from /predict
// comes back as 200 with the API's error body in "response".

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;

use crate::api::{shutdown_signal, ApiError};

pub const FRONTEND_MESSAGE: &str = "Front-end is all ready to go!";

#[derive(Debug, Clone)]
pub struct FrontendState {
    client:  reqwest::Client,
    api_url: String,
}

impl FrontendState {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { client: reqwest::Client::new(), api_url }
    }
}

fn upstream_error(err: reqwest::Error) -> ApiError {
    tracing::error!("API request failed: {}", err);
    ApiError::Internal(format!("API request failed: {err}"))
}

async fn root_handler() -> Json<&'static str> {
    tracing::info!("{}", FRONTEND_MESSAGE);
    Json(FRONTEND_MESSAGE)
}

async fn classify_handler(
    State(state): State<Arc<FrontendState>>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    tracing::debug!("Incoming input in the front end: {}", payload);
    let response = state
        .client
        .post(format!("{}/predict", state.api_url))
        .json(&payload)
        .send()
        .await
        .map_err(upstream_error)?
        .text()
        .await
        .map_err(upstream_error)?;

    tracing::debug!("Prediction: {}", response);
    Ok(Json(json!({ "response": response })))
}

async fn healthcheck_handler(State(state): State<Arc<FrontendState>>) -> Result<Json<String>, ApiError> {
    let response = state
        .client
        .get(format!("{}/", state.api_url))
        .send()
        .await
        .map_err(upstream_error)?
        .text()
        .await
        .map_err(upstream_error)?;

    tracing::info!("Checking health: {}", response);
    Ok(Json(response))
}

pub fn router(state: Arc<FrontendState>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/classify", post(classify_handler))
        .route("/healthcheck", get(healthcheck_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_frontend(addr: SocketAddr, state: FrontendState) -> anyhow::Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Front-end listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
