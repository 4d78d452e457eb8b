//! Rutas HTTP
//!
//! `create_api_router` arma todas las rutas sin middleware; `build_app`
//! agrega CORS, compresión, rate limiting, límites de body, cabeceras de
//! seguridad y trazas.

pub mod entry_exit_routes;
pub mod system_routes;
pub mod tool_routes;

use axum::{extract::DefaultBodyLimit, middleware::from_fn_with_state, Router};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::config::EnvironmentConfig;
use crate::middleware::{cors::cors_layer, rate_limit::{rate_limit_middleware, RateLimitState}, security_headers::security_headers};
use crate::state::AppState;

/// Tamaño máximo del body (JSON con URLs de fotos)
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Crear el router principal de la API
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/api/entrada-salida", entry_exit_routes::create_entry_exit_router())
        .nest("/api/herramientas", tool_routes::create_tool_router())
        .nest("/api/reportes", tool_routes::create_report_router())
        .merge(system_routes::create_system_router())
}

/// Router completo con middleware y estado
pub fn build_app(state: AppState, config: &EnvironmentConfig) -> Router {
    let rate_limit = RateLimitState::new(config);

    create_api_router()
        .layer(from_fn_with_state(rate_limit, rate_limit_middleware))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(axum::middleware::from_fn(security_headers))
        .layer(CompressionLayer::new())
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
