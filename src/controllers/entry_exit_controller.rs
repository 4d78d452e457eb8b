use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::entry_exit_dto::{IngresoSalidaRequest, ListaIngresoSalidaQuery};
use crate::models::entry_exit::IngresoSalida;
use crate::repositories::EntryExitStore;
use crate::utils::errors::{not_found_error, AppError};

const LIMITE_MAXIMO: i64 = 500;

pub struct EntryExitController {
    repository: Arc<dyn EntryExitStore>,
}

impl EntryExitController {
    pub fn new(repository: Arc<dyn EntryExitStore>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: ListaIngresoSalidaQuery) -> Result<Vec<IngresoSalida>, AppError> {
        if query.limit.map_or(false, |l| l < 1) || query.offset.map_or(false, |o| o < 0) {
            return Err(AppError::BadRequest("limit debe ser >= 1 y offset >= 0".to_string()));
        }
        let limit = query.limit.map(|l| l.min(LIMITE_MAXIMO));
        self.repository.list(limit, query.offset).await
    }

    pub async fn create(&self, request: IngresoSalidaRequest) -> Result<IngresoSalida, AppError> {
        request.validate()?;

        let registro = self.repository.create(request.into_nuevo(Utc::now())).await?;
        tracing::info!(id = %registro.id, tipo = %registro.tipo, placa = %registro.placa, "🚗 Registro de entrada/salida creado");
        Ok(registro)
    }

    pub async fn update(&self, id: Uuid, request: IngresoSalidaRequest) -> Result<IngresoSalida, AppError> {
        request.validate()?;

        self.repository
            .update(id, request.into_nuevo(Utc::now()))
            .await?
            .ok_or_else(|| not_found_error("Registro", &id.to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error("Registro", &id.to_string()));
        }
        tracing::info!(%id, "🗑️ Registro de entrada/salida eliminado");
        Ok(())
    }
}
