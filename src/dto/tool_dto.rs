use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Request para prestar una herramienta
#[derive(Debug, Deserialize)]
pub struct AsignarHerramientaRequest {
    pub empleado_id: Uuid,
}

// Herramienta pendiente de devolución
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingTool {
    pub herramienta_id: Uuid,
    pub nombre: String,
    pub sku: String,
    pub empleado: String,
    pub fecha_asignacion: DateTime<Utc>,
    pub dias_en_uso: i64,
}

// Promedio de uso de una herramienta
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiempoPromedioUso {
    pub herramienta_id: Uuid,
    pub nombre: String,
    pub sku: String,
    pub asignaciones_devueltas: usize,
    pub promedio_horas: f64,
}

// Reporte de tiempo promedio de uso
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReporteTiempoPromedio {
    pub herramientas: Vec<TiempoPromedioUso>,
    pub promedio_general_horas: Option<f64>,
}

// Empleado con más préstamos
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopUsuario {
    pub empleado_id: Uuid,
    pub nombre_completo: String,
    pub total_asignaciones: usize,
    pub horas_totales: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct TopUsuariosQuery {
    pub limit: Option<usize>,
}
