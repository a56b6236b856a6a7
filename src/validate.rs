//! Field-level validation shared by the create and update paths.

use crate::errors::ApiError;

pub const VALID_ROLES: &[&str] = &["MEDICO", "TERAPEUTA", "ADMIN", "DEVOP"];
pub const VALID_SEXO: &[&str] = &["M", "F"];
pub const VALID_ESTADO: &[&str] = &["ACTIVO", "CANCELADO"];
pub const VALID_TIEMPO_AVISO: &[&str] = &["1D", "2D", "3D", "4D", "5D", "6D", "1SEM"];

pub const INVALID_ROL: &str = "Rol inválido";
pub const INVALID_SEXO: &str = "Sexo inválido";
pub const INVALID_ESTADO: &str = "Estado inválido";
pub const INVALID_TIEMPO: &str = "Tiempo antes de cita inválido";

/// An empty submission counts as omitted; it never clears a column.
pub fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Mandatory text field on create.
pub fn required(value: Option<String>) -> Result<String, ApiError> {
    normalize(value).ok_or(ApiError::MissingFields)
}

/// Mandatory reference field on create.
pub fn required_id(value: Option<i32>) -> Result<i32, ApiError> {
    value.ok_or(ApiError::MissingFields)
}

/// Enumerated fields fail eagerly with their own message, so the first
/// invalid field encountered decides the response.
pub fn check_enum(value: &str, allowed: &[&str], message: &'static str) -> Result<(), ApiError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(ApiError::InvalidField(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_counts_as_omitted() {
        assert_eq!(normalize(Some(String::new())), None);
        assert_eq!(normalize(Some("M".into())), Some("M".into()));
        assert_eq!(normalize(None), None);
    }

    #[test]
    fn required_rejects_absent_and_empty() {
        assert!(matches!(required(None), Err(ApiError::MissingFields)));
        assert!(matches!(required(Some(String::new())), Err(ApiError::MissingFields)));
        assert_eq!(required(Some("Ana".into())).unwrap(), "Ana");
    }

    #[test]
    fn enum_membership() {
        assert!(check_enum("MEDICO", VALID_ROLES, INVALID_ROL).is_ok());
        assert!(check_enum("1SEM", VALID_TIEMPO_AVISO, INVALID_TIEMPO).is_ok());
        let err = check_enum("PENDIENTE", VALID_ESTADO, INVALID_ESTADO).unwrap_err();
        assert_eq!(err.to_string(), "Estado inválido");
    }
}
