//! Error taxonomy for the API.
//!
//! Every failure a handler can produce maps onto one variant here, and every
//! variant knows its HTTP status. Handlers return `Result<HttpResponse,
//! ApiError>` and let `?` do the rest; response bodies keep the wire
//! messages clients of this API already rely on.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

use crate::refs::RefKind;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A mandatory field was absent (or submitted empty) on create.
    #[error("Faltan campos obligatorios")]
    MissingFields,

    /// An enumerated or parsed field carried a value outside its set. The
    /// message is field-specific ("Rol inválido", "Estado inválido", ...).
    #[error("{0}")]
    InvalidField(&'static str),

    /// A reference included in the payload does not resolve to a row.
    #[error("{} no existe", .0.column())]
    ReferenceNotFound(RefKind),

    /// The row being read, updated or deleted does not exist.
    #[error("{0}")]
    NotFound(&'static str),

    /// A partial update arrived with no recognized fields.
    #[error("No hay campos para actualizar")]
    NothingToUpdate,

    /// A delete was blocked by rows still referencing the target.
    #[error("{0}")]
    DependencyConflict(&'static str),

    /// The multipart payload could not be read.
    #[error("Contenido multipart inválido")]
    InvalidPayload,

    #[error("Error al procesar la solicitud")]
    Database(#[from] diesel::result::Error),

    #[error("Error al procesar la solicitud")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("Error al procesar la solicitud")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Error al procesar la solicitud")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFields
            | ApiError::InvalidField(_)
            | ApiError::ReferenceNotFound(_)
            | ApiError::NothingToUpdate
            | ApiError::DependencyConflict(_)
            | ApiError::InvalidPayload => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Database(_)
            | ApiError::Pool(_)
            | ApiError::Hash(_)
            | ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("{self:?}");
        }
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(ApiError::MissingFields.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidField("Rol inválido").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::ReferenceNotFound(RefKind::Paciente).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NothingToUpdate.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::DependencyConflict("No se puede eliminar").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_target_maps_to_404() {
        assert_eq!(
            ApiError::NotFound("Usuario no encontrado").status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn store_errors_map_to_500() {
        assert_eq!(
            ApiError::Database(diesel::result::Error::NotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn reference_message_names_the_column() {
        assert_eq!(
            ApiError::ReferenceNotFound(RefKind::Usuario).to_string(),
            "ID_USUARIO no existe"
        );
        assert_eq!(
            ApiError::ReferenceNotFound(RefKind::Consulta).to_string(),
            "ID_CONSULTA no existe"
        );
    }
}
