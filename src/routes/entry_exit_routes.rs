use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::entry_exit_controller::EntryExitController;
use crate::dto::api_response::ApiResponse;
use crate::dto::entry_exit_dto::{IngresoSalidaRequest, ListaIngresoSalidaQuery};
use crate::models::entry_exit::IngresoSalida;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_entry_exit_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_entries).post(create_entry))
        .route("/:id", put(update_entry).delete(delete_entry))
}

async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<ListaIngresoSalidaQuery>,
) -> Result<Json<Vec<IngresoSalida>>, AppError> {
    let controller = EntryExitController::new(state.entries.clone());
    let response = controller.list(query).await?;
    Ok(Json(response))
}

async fn create_entry(
    State(state): State<AppState>,
    payload: Result<Json<IngresoSalidaRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IngresoSalida>), AppError> {
    let Json(request) = payload?;
    let controller = EntryExitController::new(state.entries.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<IngresoSalidaRequest>, JsonRejection>,
) -> Result<Json<IngresoSalida>, AppError> {
    let Json(request) = payload?;
    let controller = EntryExitController::new(state.entries.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = EntryExitController::new(state.entries.clone());
    controller.delete(id).await?;
    Ok(Json(ApiResponse::message("Registro eliminado exitosamente".to_string())))
}
