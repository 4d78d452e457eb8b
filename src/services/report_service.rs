//! Reportes de uso de herramientas para el dashboard

use std::collections::HashMap;

use uuid::Uuid;

use crate::dto::tool_dto::{ReporteTiempoPromedio, TiempoPromedioUso, TopUsuario};
use crate::models::tool::Herramienta;

pub const TOP_USUARIOS_DEFAULT: usize = 5;
pub const TOP_USUARIOS_MAX: usize = 50;

fn horas(d: chrono::Duration) -> f64 {
    d.num_seconds() as f64 / 3600.0
}

fn redondear(valor: f64) -> f64 {
    (valor * 100.0).round() / 100.0
}

/// Promedio de horas por préstamo devuelto, por herramienta y global.
/// Las herramientas sin préstamos devueltos no aparecen.
pub fn tiempo_promedio_uso(herramientas: &[Herramienta]) -> ReporteTiempoPromedio {
    let mut total_horas = 0.0;
    let mut total_devueltas = 0usize;

    let detalle = herramientas
        .iter()
        .filter_map(|h| {
            let duraciones: Vec<f64> = h.asignaciones.iter().filter_map(|a| a.duracion()).map(horas).collect();
            if duraciones.is_empty() {
                return None;
            }
            let suma: f64 = duraciones.iter().sum();
            total_horas += suma;
            total_devueltas += duraciones.len();
            Some(TiempoPromedioUso {
                herramienta_id: h.id,
                nombre: h.nombre.clone(),
                sku: h.sku.clone(),
                asignaciones_devueltas: duraciones.len(),
                promedio_horas: redondear(suma / duraciones.len() as f64),
            })
        })
        .collect();

    ReporteTiempoPromedio {
        herramientas: detalle,
        promedio_general_horas: (total_devueltas > 0).then(|| redondear(total_horas / total_devueltas as f64)),
    }
}

/// Empleados con más préstamos. Las horas solo cuentan préstamos devueltos.
pub fn top_usuarios(herramientas: &[Herramienta], limit: Option<usize>) -> Vec<TopUsuario> {
    let limit = limit.unwrap_or(TOP_USUARIOS_DEFAULT).clamp(1, TOP_USUARIOS_MAX);
    let mut por_empleado: HashMap<Uuid, TopUsuario> = HashMap::new();

    for asignacion in herramientas.iter().flat_map(|h| h.asignaciones.iter()) {
        let entry = por_empleado.entry(asignacion.empleado.id).or_insert_with(|| TopUsuario {
            empleado_id: asignacion.empleado.id,
            nombre_completo: asignacion.empleado.nombre_completo(),
            total_asignaciones: 0,
            horas_totales: 0.0,
        });
        entry.total_asignaciones += 1;
        if let Some(d) = asignacion.duracion() {
            entry.horas_totales += horas(d);
        }
    }

    let mut usuarios: Vec<TopUsuario> = por_empleado
        .into_values()
        .map(|mut u| {
            u.horas_totales = redondear(u.horas_totales);
            u
        })
        .collect();
    usuarios.sort_by(|a, b| {
        b.total_asignaciones
            .cmp(&a.total_asignaciones)
            .then_with(|| b.horas_totales.total_cmp(&a.horas_totales))
            .then_with(|| a.nombre_completo.cmp(&b.nombre_completo))
    });
    usuarios.truncate(limit);
    usuarios
}
