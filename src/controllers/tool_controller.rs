use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::dto::tool_dto::{AsignarHerramientaRequest, PendingTool, ReporteTiempoPromedio, TopUsuario, TopUsuariosQuery};
use crate::models::tool::AsignacionHerramienta;
use crate::repositories::ToolStore;
use crate::services::{pending_tools_service, report_service};
use crate::utils::errors::AppError;

pub struct ToolController {
    repository: Arc<dyn ToolStore>,
}

impl ToolController {
    pub fn new(repository: Arc<dyn ToolStore>) -> Self {
        Self { repository }
    }

    pub async fn pending(&self) -> Result<Vec<PendingTool>, AppError> {
        pending_tools_service::get_pending_tools(self.repository.as_ref(), Utc::now()).await
    }

    pub async fn assign(&self, herramienta_id: Uuid, request: AsignarHerramientaRequest) -> Result<AsignacionHerramienta, AppError> {
        self.repository.assign(herramienta_id, request.empleado_id, Utc::now()).await
    }

    pub async fn return_tool(&self, herramienta_id: Uuid) -> Result<AsignacionHerramienta, AppError> {
        self.repository.return_tool(herramienta_id, Utc::now()).await
    }

    pub async fn average_usage(&self) -> Result<ReporteTiempoPromedio, AppError> {
        let herramientas = self.repository.find_tools_with_history().await?;
        Ok(report_service::tiempo_promedio_uso(&herramientas))
    }

    pub async fn top_users(&self, query: TopUsuariosQuery) -> Result<Vec<TopUsuario>, AppError> {
        let herramientas = self.repository.find_tools_with_history().await?;
        Ok(report_service::top_usuarios(&herramientas, query.limit))
    }
}
