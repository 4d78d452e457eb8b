use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::entry_exit::{NuevoIngresoSalida, TipoMovimiento};
use crate::utils::validation::{validate_celular, validate_fotos, validate_not_empty, validate_placa};

// Request para crear o reemplazar un registro de entrada/salida
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IngresoSalidaRequest {
    pub fecha: Option<DateTime<Utc>>,

    pub tipo: TipoMovimiento,

    #[validate(custom = "validate_placa", length(max = 20))]
    pub placa: String,

    #[validate(custom = "validate_not_empty", length(max = 120))]
    pub nombre_conductor: String,

    #[validate(custom = "validate_celular")]
    pub celular: String,

    #[validate(length(max = 2000))]
    pub observaciones: Option<String>,

    #[serde(default)]
    #[validate(custom = "validate_fotos")]
    pub fotos: Vec<String>,
}

impl IngresoSalidaRequest {
    /// Registro a guardar tal como llegó; sin fecha se usa `now`
    pub fn into_nuevo(self, now: DateTime<Utc>) -> NuevoIngresoSalida {
        NuevoIngresoSalida {
            fecha: self.fecha.unwrap_or(now),
            tipo: self.tipo,
            placa: self.placa,
            nombre_conductor: self.nombre_conductor,
            celular: self.celular,
            observaciones: self.observaciones,
            fotos: self.fotos,
        }
    }
}

// Paginación opcional del listado
#[derive(Debug, Default, Deserialize)]
pub struct ListaIngresoSalidaQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
