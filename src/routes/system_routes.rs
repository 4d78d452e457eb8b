use axum::{extract::State, http::header, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use crate::metrics;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_system_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_endpoint))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn metrics_endpoint(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = metrics::render(&state.metrics_registry)?;
    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}
