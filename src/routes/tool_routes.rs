use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::tool_controller::ToolController;
use crate::dto::api_response::ApiResponse;
use crate::dto::tool_dto::{AsignarHerramientaRequest, PendingTool, ReporteTiempoPromedio, TopUsuario, TopUsuariosQuery};
use crate::models::tool::AsignacionHerramienta;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_tool_router() -> Router<AppState> {
    Router::new()
        .route("/pendientes", get(pending_tools))
        .route("/:id/asignar", post(assign_tool))
        .route("/:id/devolver", post(return_tool))
}

pub fn create_report_router() -> Router<AppState> {
    Router::new()
        .route("/tiempo-promedio-uso", get(average_usage))
        .route("/top-usuarios", get(top_users))
}

async fn pending_tools(State(state): State<AppState>) -> Result<Json<Vec<PendingTool>>, AppError> {
    let controller = ToolController::new(state.tools.clone());
    let response = controller.pending().await?;
    Ok(Json(response))
}

async fn assign_tool(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<AsignarHerramientaRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AsignacionHerramienta>>), AppError> {
    let Json(request) = payload?;
    let controller = ToolController::new(state.tools.clone());
    let asignacion = controller.assign(id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(asignacion, "Herramienta asignada exitosamente".to_string())),
    ))
}

async fn return_tool(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AsignacionHerramienta>>, AppError> {
    let controller = ToolController::new(state.tools.clone());
    let asignacion = controller.return_tool(id).await?;
    Ok(Json(ApiResponse::success_with_message(asignacion, "Herramienta devuelta exitosamente".to_string())))
}

async fn average_usage(State(state): State<AppState>) -> Result<Json<ReporteTiempoPromedio>, AppError> {
    let controller = ToolController::new(state.tools.clone());
    Ok(Json(controller.average_usage().await?))
}

async fn top_users(
    State(state): State<AppState>,
    Query(query): Query<TopUsuariosQuery>,
) -> Result<Json<Vec<TopUsuario>>, AppError> {
    let controller = ToolController::new(state.tools.clone());
    Ok(Json(controller.top_users(query).await?))
}
