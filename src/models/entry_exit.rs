//! Modelo de IngresoSalida
//!
//! Registro de un evento de entrada o salida de un vehículo por la caseta,
//! con los datos del conductor y las fotos tomadas en el momento.
//! Mapea a la tabla `entradas_salidas`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Tipo de movimiento - mapea al ENUM tipo_movimiento
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "tipo_movimiento", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TipoMovimiento {
    Entrada,
    Salida,
}

impl std::fmt::Display for TipoMovimiento {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TipoMovimiento::Entrada => write!(f, "entrada"),
            TipoMovimiento::Salida => write!(f, "salida"),
        }
    }
}

/// Registro de entrada/salida tal como vive en la base de datos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IngresoSalida {
    pub id: Uuid,
    pub fecha: DateTime<Utc>,
    pub tipo: TipoMovimiento,
    pub placa: String,
    pub nombre_conductor: String,
    pub celular: String,
    pub observaciones: Option<String>,
    pub fotos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Datos ya validados para insertar o reemplazar un registro
#[derive(Debug, Clone, PartialEq)]
pub struct NuevoIngresoSalida {
    pub fecha: DateTime<Utc>,
    pub tipo: TipoMovimiento,
    pub placa: String,
    pub nombre_conductor: String,
    pub celular: String,
    pub observaciones: Option<String>,
    pub fotos: Vec<String>,
}

impl NuevoIngresoSalida {
    /// Materializa el registro con un id y fecha de creación dados
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> IngresoSalida {
        IngresoSalida {
            id,
            fecha: self.fecha,
            tipo: self.tipo,
            placa: self.placa,
            nombre_conductor: self.nombre_conductor,
            celular: self.celular,
            observaciones: self.observaciones,
            fotos: self.fotos,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tipo_movimiento_serde() {
        let json = serde_json::to_string(&TipoMovimiento::Entrada).unwrap();
        assert_eq!(json, "\"entrada\"");
        let tipo: TipoMovimiento = serde_json::from_str("\"salida\"").unwrap();
        assert_eq!(tipo, TipoMovimiento::Salida);
        assert!(serde_json::from_str::<TipoMovimiento>("\"otro\"").is_err());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = NuevoIngresoSalida {
            fecha: Utc::now(),
            tipo: TipoMovimiento::Entrada,
            placa: "ABC-1234".into(),
            nombre_conductor: "Juan Pérez".into(),
            celular: "5512345678".into(),
            observaciones: None,
            fotos: vec![],
        }
        .into_record(Uuid::new_v4(), Utc::now());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["nombreConductor"], "Juan Pérez");
        assert_eq!(value["tipo"], "entrada");
        assert!(value["fotos"].as_array().unwrap().is_empty());
    }
}
