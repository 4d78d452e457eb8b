use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::tool::{
    AsignacionHerramienta, AsignacionRow, EstadoAsignacion, EstadoProducto, Herramienta, ProductoRow,
};
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Acceso a herramientas y a su historial de préstamos
#[async_trait]
pub trait ToolStore: Send + Sync {
    /// Herramientas con estado 'En Uso', con su historial completo
    async fn find_tools_in_use(&self) -> AppResult<Vec<Herramienta>>;

    /// Todas las herramientas con su historial completo
    async fn find_tools_with_history(&self) -> AppResult<Vec<Herramienta>>;

    /// Abre un préstamo; falla con `Conflict` si ya hay uno activo
    async fn assign(&self, herramienta_id: Uuid, empleado_id: Uuid, now: DateTime<Utc>) -> AppResult<AsignacionHerramienta>;

    /// Cierra el préstamo activo; falla con `Conflict` si no existe
    async fn return_tool(&self, herramienta_id: Uuid, now: DateTime<Utc>) -> AppResult<AsignacionHerramienta>;
}

const SELECT_ASIGNACIONES: &str = r#"
    SELECT a.id, a.producto_id, a.empleado_id,
           e.nombre AS empleado_nombre, e.apellido AS empleado_apellido,
           a.fecha_asignacion, a.fecha_devolucion
    FROM asignaciones_herramienta a
    JOIN empleados e ON e.id = a.empleado_id
"#;

pub struct ToolRepository {
    pool: PgPool,
}

impl ToolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_history(&self, productos: Vec<ProductoRow>) -> AppResult<Vec<Herramienta>> {
        if productos.is_empty() {
            return Ok(vec![]);
        }

        let ids: Vec<Uuid> = productos.iter().map(|p| p.id).collect();
        let rows = sqlx::query_as::<_, AsignacionRow>(&format!(
            "{} WHERE a.producto_id = ANY($1) ORDER BY a.fecha_asignacion",
            SELECT_ASIGNACIONES
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut por_producto: HashMap<Uuid, Vec<AsignacionHerramienta>> = HashMap::new();
        for row in rows {
            por_producto.entry(row.producto_id).or_default().push(row.into());
        }

        productos
            .into_iter()
            .map(|p| {
                let asignaciones = por_producto.remove(&p.id).unwrap_or_default();
                Herramienta::from_rows(p, asignaciones).map_err(AppError::Internal)
            })
            .collect()
    }

    /// Bloquea la fila del producto y carga su historial dentro de la transacción
    async fn lock_tool(tx: &mut Transaction<'_, Postgres>, herramienta_id: Uuid) -> AppResult<Herramienta> {
        let producto = sqlx::query_as::<_, ProductoRow>(
            "SELECT id, nombre, sku, es_herramienta, estado FROM productos WHERE id = $1 FOR UPDATE",
        )
        .bind(herramienta_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| not_found_error("Herramienta", &herramienta_id.to_string()))?;

        let asignaciones = sqlx::query_as::<_, AsignacionRow>(&format!(
            "{} WHERE a.producto_id = $1 ORDER BY a.fecha_asignacion",
            SELECT_ASIGNACIONES
        ))
        .bind(herramienta_id)
        .fetch_all(&mut **tx)
        .await?
        .into_iter()
        .map(AsignacionHerramienta::from)
        .collect();

        Herramienta::from_rows(producto, asignaciones).map_err(AppError::Internal)
    }

    async fn set_estado(tx: &mut Transaction<'_, Postgres>, herramienta_id: Uuid, estado: EstadoProducto) -> AppResult<()> {
        sqlx::query("UPDATE productos SET estado = $2 WHERE id = $1")
            .bind(herramienta_id)
            .bind(estado.as_str())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

/// El índice único parcial sobre préstamos activos reporta 23505
fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|d| d.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}

#[async_trait]
impl ToolStore for ToolRepository {
    async fn find_tools_in_use(&self) -> AppResult<Vec<Herramienta>> {
        let productos = sqlx::query_as::<_, ProductoRow>(
            "SELECT id, nombre, sku, es_herramienta, estado FROM productos WHERE es_herramienta = TRUE AND estado = $1",
        )
        .bind(EstadoProducto::EnUso.as_str())
        .fetch_all(&self.pool)
        .await?;

        self.load_history(productos).await
    }

    async fn find_tools_with_history(&self) -> AppResult<Vec<Herramienta>> {
        let productos = sqlx::query_as::<_, ProductoRow>(
            "SELECT id, nombre, sku, es_herramienta, estado FROM productos WHERE es_herramienta = TRUE ORDER BY nombre",
        )
        .fetch_all(&self.pool)
        .await?;

        self.load_history(productos).await
    }

    async fn assign(&self, herramienta_id: Uuid, empleado_id: Uuid, now: DateTime<Utc>) -> AppResult<AsignacionHerramienta> {
        let mut tx = self.pool.begin().await?;

        let herramienta = Self::lock_tool(&mut tx, herramienta_id).await?;
        herramienta.validar_asignacion()?;

        let empleado = sqlx::query_as::<_, crate::models::employee::Empleado>(
            "SELECT id, nombre, apellido FROM empleados WHERE id = $1",
        )
        .bind(empleado_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| not_found_error("Empleado", &empleado_id.to_string()))?;

        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO asignaciones_herramienta (id, producto_id, empleado_id, fecha_asignacion, fecha_devolucion)
            VALUES ($1, $2, $3, $4, NULL)
            "#,
        )
        .bind(id)
        .bind(herramienta_id)
        .bind(empleado_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("La herramienta '{}' ya tiene un préstamo activo", herramienta.nombre))
            } else {
                AppError::Database(e)
            }
        })?;

        Self::set_estado(&mut tx, herramienta_id, EstadoProducto::EnUso).await?;
        tx.commit().await?;

        tracing::info!(%herramienta_id, %empleado_id, "🔧 Herramienta '{}' asignada", herramienta.nombre);

        Ok(AsignacionHerramienta {
            id,
            producto_id: herramienta_id,
            empleado,
            fecha_asignacion: now,
            estado: EstadoAsignacion::Activa,
        })
    }

    async fn return_tool(&self, herramienta_id: Uuid, now: DateTime<Utc>) -> AppResult<AsignacionHerramienta> {
        let mut tx = self.pool.begin().await?;

        let herramienta = Self::lock_tool(&mut tx, herramienta_id).await?;
        let activa = herramienta.validar_devolucion()?.clone();

        sqlx::query("UPDATE asignaciones_herramienta SET fecha_devolucion = $2 WHERE id = $1")
            .bind(activa.id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        Self::set_estado(&mut tx, herramienta_id, EstadoProducto::Disponible).await?;
        tx.commit().await?;

        tracing::info!(%herramienta_id, "📥 Herramienta '{}' devuelta", herramienta.nombre);

        Ok(AsignacionHerramienta {
            estado: EstadoAsignacion::Devuelta { fecha_devolucion: now },
            ..activa
        })
    }
}
