//! Utilidades de validación
//!
//! Validadores personalizados usados por los requests de la API
//! (`#[validate(custom = "...")]`).

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Celular: exactamente 10 dígitos
    pub static ref CELULAR_REGEX: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
}

/// Validar formato de celular (exactamente 10 dígitos, sin separadores)
pub fn validate_celular(value: &str) -> Result<(), ValidationError> {
    if !CELULAR_REGEX.is_match(value) {
        let mut error = ValidationError::new("celular");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"10 dígitos".to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_empty"));
    }
    Ok(())
}

/// Validar la lista de URLs de fotos: ninguna vacía y todas http(s)
pub fn validate_fotos(fotos: &[String]) -> Result<(), ValidationError> {
    for foto in fotos {
        if foto.trim().is_empty() || !(foto.starts_with("http://") || foto.starts_with("https://")) {
            let mut error = ValidationError::new("foto_url");
            error.add_param("value".into(), &foto.to_string());
            return Err(error);
        }
    }
    Ok(())
}

/// Validar formato de matrícula de vehículo: 5 a 10 caracteres sin separadores
pub fn validate_placa(value: &str) -> Result<(), ValidationError> {
    let caracteres = value.chars().filter(|c| !matches!(c, ' ' | '-' | '_')).count();
    if !(5..=10).contains(&caracteres) {
        let mut error = ValidationError::new("placa");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_celular() {
        assert!(validate_celular("5512345678").is_ok());
        assert!(validate_celular("0000000000").is_ok());
        assert!(validate_celular("551234567").is_err());
        assert!(validate_celular("55123456789").is_err());
        assert!(validate_celular("55-1234-567").is_err());
        assert!(validate_celular("abcdefghij").is_err());
        assert!(validate_celular("").is_err());
    }

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("Juan").is_ok());
        assert!(validate_not_empty("   ").is_err());
    }

    #[test]
    fn test_validate_fotos() {
        assert!(validate_fotos(&vec![]).is_ok());
        assert!(validate_fotos(&vec!["https://cdn.example.com/a.jpg".into()]).is_ok());
        assert!(validate_fotos(&vec!["".into()]).is_err());
        assert!(validate_fotos(&vec!["ftp://x/a.jpg".into()]).is_err());
        assert!(validate_fotos(&vec![" https://cdn.example.com/a.jpg".into()]).is_err());
    }

    #[test]
    fn test_validate_placa() {
        assert!(validate_placa("ABC-123-D").is_ok());
        assert!(validate_placa("A1").is_err());
        assert!(validate_placa("ABCDEFGHIJK").is_err());
        // Cuenta caracteres, no bytes
        assert!(validate_placa("ÑÑÑ-123").is_ok());
    }
}
