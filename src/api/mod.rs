//! HTTP API
//!
//! Thin dispatch layer mapping requests onto the prediction executor and
//! the edge engine, and their results onto status codes.


use crate::edge::EdgeEngine;
use crate::error::ServeError;
use crate::ml::PredictionExecutor;
use crate::model::{LoadSummary, ModelRegistry};
use crate::odds::OddsFormat;
use crate::types::{
    EdgeRequest, EdgeResponse, ErrorResponse, KellyRequest, KellyResponse, ModelNotFoundResponse,
    ModelsResponse, PredictRequest,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// State shared across handlers
pub struct AppState {
    pub executor: PredictionExecutor,
    pub edge: EdgeEngine,
}

impl AppState {
    pub fn new(executor: PredictionExecutor, edge: EdgeEngine) -> Self {
        Self { executor, edge }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        self.executor.registry()
    }
}

impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}

fn not_found(state: &AppState, version: &str) -> Response {
    let body = ModelNotFoundResponse::new(version, state.registry().list_versions());
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

fn parse_format(format: Option<&str>) -> Result<OddsFormat, ServeError> {
    format.map_or(Ok(OddsFormat::default()), |f| f.parse())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.registry().list_versions(),
    })
}

async fn get_model(State(state): State<Arc<AppState>>, Path(version): Path<String>) -> Response {
    match state.registry().model_info(&version) {
        Some(info) => Json(info).into_response(),
        None => not_found(&state, &version),
    }
}

async fn reload_models(State(state): State<Arc<AppState>>) -> Result<Json<LoadSummary>, Response> {
    let registry = state.registry().clone();
    tokio::task::spawn_blocking(move || registry.load_all())
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Model reload task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Model reload failed")),
            )
                .into_response()
        })
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Path(version): Path<String>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    let features = match request.features {
        Some(features) if !features.is_empty() => features,
        _ => return bad_request("No features provided"),
    };

    match state.executor.predict(&version, &features) {
        Some(outcome) => Json(outcome).into_response(),
        None => not_found(&state, &version),
    }
}

async fn evaluate_edge(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EdgeRequest>, JsonRejection>,
) -> Result<Json<EdgeResponse>, Response> {
    let Json(request) = body.map_err(|rejection| bad_request(rejection.body_text()))?;
    let format = parse_format(request.odds_format.as_deref()).map_err(IntoResponse::into_response)?;

    let calculation = state
        .edge
        .evaluate(
            request.model_probability,
            &request.bookmaker_odds,
            format,
            request.edge_threshold,
            request.bet_amount,
        )
        .map_err(IntoResponse::into_response)?;

    let kelly_stake = match request.kelly_fraction {
        Some(fraction) => Some(
            state
                .edge
                .kelly_stake(request.model_probability, &request.bookmaker_odds, format, Some(fraction))
                .map_err(IntoResponse::into_response)?,
        ),
        None => None,
    };

    Ok(Json(EdgeResponse {
        calculation: calculation.rounded(),
        kelly_stake: kelly_stake.map(crate::edge::round4),
    }))
}

async fn kelly(
    State(state): State<Arc<AppState>>,
    body: Result<Json<KellyRequest>, JsonRejection>,
) -> Result<Json<KellyResponse>, Response> {
    let Json(request) = body.map_err(|rejection| bad_request(rejection.body_text()))?;
    let format = parse_format(request.odds_format.as_deref()).map_err(IntoResponse::into_response)?;

    let kelly_stake = state
        .edge
        .kelly_stake(request.model_probability, &request.bookmaker_odds, format, request.fraction)
        .map_err(IntoResponse::into_response)?;

    Ok(Json(KellyResponse {
        kelly_stake: crate::edge::round4(kelly_stake),
    }))
}

/// Create API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/models", get(list_models))
        .route("/models/reload", post(reload_models))
        .route("/models/{version}", get(get_model))
        .route("/predict/{version}", post(predict))
        .route("/edge", post(evaluate_edge))
        .route("/kelly", post(kelly))
        .with_state(state)
}

/// Start API server
pub async fn start_server(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Prediction server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
