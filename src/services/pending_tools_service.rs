//! Herramientas pendientes de devolución
//!
//! Obtiene las herramientas con estado 'En Uso', toma su préstamo activo y
//! calcula los días completos que lleva fuera del almacén.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::dto::tool_dto::PendingTool;
use crate::models::tool::Herramienta;
use crate::repositories::ToolStore;
use crate::utils::errors::AppResult;

/// Días completos transcurridos (nunca negativo)
pub fn dias_en_uso(fecha_asignacion: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - fecha_asignacion).num_days().max(0)
}

/// Arma la lista de pendientes a partir de herramientas ya cargadas.
///
/// Una herramienta 'En Uso' sin préstamo activo es un dato inconsistente:
/// se omite y se registra.
pub fn pending_tools_from(herramientas: &[Herramienta], now: DateTime<Utc>) -> Vec<PendingTool> {
    let mut pendientes: Vec<PendingTool> = herramientas
        .iter()
        .filter(|h| h.esta_en_uso())
        .filter_map(|h| match h.asignacion_activa() {
            Some(asignacion) => Some(PendingTool {
                herramienta_id: h.id,
                nombre: h.nombre.clone(),
                sku: h.sku.clone(),
                empleado: asignacion.empleado.nombre_completo(),
                fecha_asignacion: asignacion.fecha_asignacion,
                dias_en_uso: dias_en_uso(asignacion.fecha_asignacion, now),
            }),
            None => {
                warn!(herramienta_id = %h.id, sku = %h.sku, "⚠️ Herramienta 'En Uso' sin asignación activa, se omite");
                None
            }
        })
        .collect();

    pendientes.sort_by(|a, b| b.dias_en_uso.cmp(&a.dias_en_uso).then_with(|| a.nombre.cmp(&b.nombre)));
    pendientes
}

/// Consulta el store y devuelve las herramientas pendientes.
///
/// Un fallo del store se propaga como `Err`; `Ok(vec![])` significa que
/// realmente no hay nada pendiente.
pub async fn get_pending_tools(store: &dyn ToolStore, now: DateTime<Utc>) -> AppResult<Vec<PendingTool>> {
    let herramientas = store.find_tools_in_use().await?;
    Ok(pending_tools_from(&herramientas, now))
}
