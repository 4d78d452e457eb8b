use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::entry_exit::{IngresoSalida, NuevoIngresoSalida};
use crate::utils::errors::{AppError, AppResult};

/// Acceso al log de entradas/salidas
#[async_trait]
pub trait EntryExitStore: Send + Sync {
    /// Registros ordenados por `fecha` descendente
    async fn list(&self, limit: Option<i64>, offset: Option<i64>) -> AppResult<Vec<IngresoSalida>>;

    async fn create(&self, nuevo: NuevoIngresoSalida) -> AppResult<IngresoSalida>;

    /// `None` si el id no existe
    async fn update(&self, id: Uuid, nuevo: NuevoIngresoSalida) -> AppResult<Option<IngresoSalida>>;

    /// `false` si el id no existe
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub struct EntryExitRepository {
    pool: PgPool,
}

impl EntryExitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryExitStore for EntryExitRepository {
    async fn list(&self, limit: Option<i64>, offset: Option<i64>) -> AppResult<Vec<IngresoSalida>> {
        let registros = sqlx::query_as::<_, IngresoSalida>(
            r#"
            SELECT id, fecha, tipo, placa, nombre_conductor, celular, observaciones, fotos, created_at
            FROM entradas_salidas
            ORDER BY fecha DESC, created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset.unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "❌ Error listando entradas/salidas");
            AppError::Database(e)
        })?;

        Ok(registros)
    }

    async fn create(&self, nuevo: NuevoIngresoSalida) -> AppResult<IngresoSalida> {
        let registro = sqlx::query_as::<_, IngresoSalida>(
            r#"
            INSERT INTO entradas_salidas
                (id, fecha, tipo, placa, nombre_conductor, celular, observaciones, fotos, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, fecha, tipo, placa, nombre_conductor, celular, observaciones, fotos, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(nuevo.fecha)
        .bind(nuevo.tipo)
        .bind(nuevo.placa)
        .bind(nuevo.nombre_conductor)
        .bind(nuevo.celular)
        .bind(nuevo.observaciones)
        .bind(nuevo.fotos)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "❌ Error creando entrada/salida");
            AppError::Database(e)
        })?;

        Ok(registro)
    }

    async fn update(&self, id: Uuid, nuevo: NuevoIngresoSalida) -> AppResult<Option<IngresoSalida>> {
        let registro = sqlx::query_as::<_, IngresoSalida>(
            r#"
            UPDATE entradas_salidas
            SET fecha = $2, tipo = $3, placa = $4, nombre_conductor = $5,
                celular = $6, observaciones = $7, fotos = $8
            WHERE id = $1
            RETURNING id, fecha, tipo, placa, nombre_conductor, celular, observaciones, fotos, created_at
            "#,
        )
        .bind(id)
        .bind(nuevo.fecha)
        .bind(nuevo.tipo)
        .bind(nuevo.placa)
        .bind(nuevo.nombre_conductor)
        .bind(nuevo.celular)
        .bind(nuevo.observaciones)
        .bind(nuevo.fotos)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, %id, "❌ Error actualizando entrada/salida");
            AppError::Database(e)
        })?;

        Ok(registro)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM entradas_salidas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, %id, "❌ Error eliminando entrada/salida");
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }
}
