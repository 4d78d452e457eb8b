//! Modelo de Herramienta y sus asignaciones
//!
//! Un producto del inventario marcado como herramienta puede prestarse a un
//! empleado. Cada préstamo es una `AsignacionHerramienta` cuyo estado es
//! `Activa` mientras no haya fecha de devolución.
//!
//! Invariante: una herramienta tiene como máximo una asignación `Activa`.
//! Se verifica aquí (`validar_asignacion`) antes de escribir y la base de
//! datos la respalda con un índice único parcial.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::models::employee::Empleado;

/// Estado del producto - se guarda como TEXT con el valor legible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstadoProducto {
    #[serde(rename = "Disponible")]
    Disponible,
    #[serde(rename = "En Uso")]
    EnUso,
    #[serde(rename = "En Mantenimiento")]
    EnMantenimiento,
    #[serde(rename = "Baja")]
    Baja,
}

impl EstadoProducto {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoProducto::Disponible => "Disponible",
            EstadoProducto::EnUso => "En Uso",
            EstadoProducto::EnMantenimiento => "En Mantenimiento",
            EstadoProducto::Baja => "Baja",
        }
    }
}

impl std::fmt::Display for EstadoProducto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstadoProducto {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Disponible" => Ok(EstadoProducto::Disponible),
            "En Uso" => Ok(EstadoProducto::EnUso),
            "En Mantenimiento" => Ok(EstadoProducto::EnMantenimiento),
            "Baja" => Ok(EstadoProducto::Baja),
            other => Err(format!("Estado de producto desconocido: {}", other)),
        }
    }
}

/// Estado de una asignación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "estado", rename_all = "snake_case")]
pub enum EstadoAsignacion {
    Activa,
    Devuelta { fecha_devolucion: DateTime<Utc> },
}

/// Préstamo de una herramienta a un empleado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsignacionHerramienta {
    pub id: Uuid,
    pub producto_id: Uuid,
    pub empleado: Empleado,
    pub fecha_asignacion: DateTime<Utc>,
    #[serde(flatten)]
    pub estado: EstadoAsignacion,
}

impl AsignacionHerramienta {
    pub fn esta_activa(&self) -> bool {
        matches!(self.estado, EstadoAsignacion::Activa)
    }

    /// Duración del préstamo; `None` mientras siga activo
    pub fn duracion(&self) -> Option<chrono::Duration> {
        match self.estado {
            EstadoAsignacion::Activa => None,
            EstadoAsignacion::Devuelta { fecha_devolucion } => {
                Some(fecha_devolucion - self.fecha_asignacion)
            }
        }
    }
}

/// Fila de `asignaciones_herramienta` con el nombre del empleado ya unido
#[derive(Debug, Clone, FromRow)]
pub struct AsignacionRow {
    pub id: Uuid,
    pub producto_id: Uuid,
    pub empleado_id: Uuid,
    pub empleado_nombre: String,
    pub empleado_apellido: String,
    pub fecha_asignacion: DateTime<Utc>,
    pub fecha_devolucion: Option<DateTime<Utc>>,
}

impl From<AsignacionRow> for AsignacionHerramienta {
    fn from(row: AsignacionRow) -> Self {
        Self {
            id: row.id,
            producto_id: row.producto_id,
            empleado: Empleado {
                id: row.empleado_id,
                nombre: row.empleado_nombre,
                apellido: row.empleado_apellido,
            },
            fecha_asignacion: row.fecha_asignacion,
            estado: match row.fecha_devolucion {
                None => EstadoAsignacion::Activa,
                Some(fecha_devolucion) => EstadoAsignacion::Devuelta { fecha_devolucion },
            },
        }
    }
}

/// Fila de `productos`
#[derive(Debug, Clone, FromRow)]
pub struct ProductoRow {
    pub id: Uuid,
    pub nombre: String,
    pub sku: String,
    pub es_herramienta: bool,
    pub estado: String,
}

/// Producto con su historial de asignaciones
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Herramienta {
    pub id: Uuid,
    pub nombre: String,
    pub sku: String,
    pub es_herramienta: bool,
    pub estado: EstadoProducto,
    pub asignaciones: Vec<AsignacionHerramienta>,
}

impl Herramienta {
    pub fn from_rows(producto: ProductoRow, asignaciones: Vec<AsignacionHerramienta>) -> Result<Self, String> {
        Ok(Self {
            id: producto.id,
            nombre: producto.nombre,
            sku: producto.sku,
            es_herramienta: producto.es_herramienta,
            estado: producto.estado.parse()?,
            asignaciones,
        })
    }

    /// Herramienta prestada actualmente
    pub fn esta_en_uso(&self) -> bool {
        self.es_herramienta && self.estado == EstadoProducto::EnUso
    }

    pub fn asignacion_activa(&self) -> Option<&AsignacionHerramienta> {
        self.asignaciones.iter().find(|a| a.esta_activa())
    }

    /// Verifica que la herramienta pueda prestarse de nuevo
    pub fn validar_asignacion(&self) -> Result<(), AsignacionError> {
        if !self.es_herramienta {
            return Err(AsignacionError::NoEsHerramienta(self.nombre.clone()));
        }
        if let Some(activa) = self.asignacion_activa() {
            return Err(AsignacionError::YaAsignada {
                herramienta: self.nombre.clone(),
                empleado: activa.empleado.nombre_completo(),
            });
        }
        if matches!(self.estado, EstadoProducto::EnMantenimiento | EstadoProducto::Baja) {
            return Err(AsignacionError::NoDisponible {
                herramienta: self.nombre.clone(),
                estado: self.estado,
            });
        }
        Ok(())
    }

    /// Verifica que exista un préstamo abierto que cerrar
    pub fn validar_devolucion(&self) -> Result<&AsignacionHerramienta, AsignacionError> {
        self.asignacion_activa()
            .ok_or_else(|| AsignacionError::SinAsignacionActiva(self.nombre.clone()))
    }
}

/// Reglas de negocio violadas al asignar o devolver
#[derive(Debug, Error, PartialEq)]
pub enum AsignacionError {
    #[error("El producto '{0}' no es una herramienta")]
    NoEsHerramienta(String),

    #[error("La herramienta '{herramienta}' ya está asignada a {empleado}")]
    YaAsignada { herramienta: String, empleado: String },

    #[error("La herramienta '{herramienta}' no está disponible (estado: {estado})")]
    NoDisponible { herramienta: String, estado: EstadoProducto },

    #[error("La herramienta '{0}' no tiene una asignación activa")]
    SinAsignacionActiva(String),
}

impl From<AsignacionError> for crate::utils::errors::AppError {
    fn from(e: AsignacionError) -> Self {
        crate::utils::errors::AppError::Conflict(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn empleado(nombre: &str) -> Empleado {
        Empleado { id: Uuid::new_v4(), nombre: nombre.into(), apellido: "López".into() }
    }

    fn herramienta(estado: EstadoProducto, asignaciones: Vec<AsignacionHerramienta>) -> Herramienta {
        Herramienta {
            id: Uuid::new_v4(),
            nombre: "Taladro".into(),
            sku: "100".into(),
            es_herramienta: true,
            estado,
            asignaciones,
        }
    }

    fn asignacion(empleado: Empleado, devuelta: Option<DateTime<Utc>>) -> AsignacionHerramienta {
        AsignacionHerramienta {
            id: Uuid::new_v4(),
            producto_id: Uuid::new_v4(),
            empleado,
            fecha_asignacion: Utc::now() - Duration::days(3),
            estado: match devuelta {
                None => EstadoAsignacion::Activa,
                Some(fecha_devolucion) => EstadoAsignacion::Devuelta { fecha_devolucion },
            },
        }
    }

    #[test]
    fn test_estado_producto_round_trip_text() {
        for estado in [
            EstadoProducto::Disponible,
            EstadoProducto::EnUso,
            EstadoProducto::EnMantenimiento,
            EstadoProducto::Baja,
        ] {
            assert_eq!(estado.as_str().parse::<EstadoProducto>().unwrap(), estado);
        }
        assert!("Perdido".parse::<EstadoProducto>().is_err());
    }

    #[test]
    fn test_row_without_return_date_is_active() {
        let row = AsignacionRow {
            id: Uuid::new_v4(),
            producto_id: Uuid::new_v4(),
            empleado_id: Uuid::new_v4(),
            empleado_nombre: "Ana".into(),
            empleado_apellido: "Ruiz".into(),
            fecha_asignacion: Utc::now(),
            fecha_devolucion: None,
        };
        let asignacion: AsignacionHerramienta = row.into();
        assert!(asignacion.esta_activa());
        assert!(asignacion.duracion().is_none());
    }

    #[test]
    fn test_cannot_assign_twice() {
        let h = herramienta(EstadoProducto::EnUso, vec![asignacion(empleado("Ana"), None)]);
        match h.validar_asignacion() {
            Err(AsignacionError::YaAsignada { empleado, .. }) => assert_eq!(empleado, "Ana López"),
            other => panic!("se esperaba YaAsignada, se obtuvo {:?}", other),
        }
    }

    #[test]
    fn test_returned_history_allows_new_assignment() {
        let h = herramienta(
            EstadoProducto::Disponible,
            vec![asignacion(empleado("Ana"), Some(Utc::now()))],
        );
        assert!(h.validar_asignacion().is_ok());
        assert!(h.validar_devolucion().is_err());
    }

    #[test]
    fn test_non_tool_cannot_be_assigned() {
        let mut h = herramienta(EstadoProducto::Disponible, vec![]);
        h.es_herramienta = false;
        assert!(matches!(h.validar_asignacion(), Err(AsignacionError::NoEsHerramienta(_))));
    }

    #[test]
    fn test_tool_in_maintenance_cannot_be_assigned() {
        let h = herramienta(EstadoProducto::EnMantenimiento, vec![]);
        assert!(matches!(h.validar_asignacion(), Err(AsignacionError::NoDisponible { .. })));
    }
}
