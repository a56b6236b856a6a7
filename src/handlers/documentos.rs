//! Document endpoints.
//!
//! Uploads arrive as multipart forms; the file part is buffered fully in
//! memory and handed to the store as opaque bytes. Downloads stream those
//! bytes back with a content type derived from the stored document type.

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use diesel::prelude::*;
use futures::{StreamExt, TryStreamExt};
use serde_json::json;

use crate::errors::ApiError;
use crate::models::{DocumentoInfo, DocumentoInsert, DocumentoMeta};
use crate::patch::DocumentoChangeset;
use crate::refs::verify_references;
use crate::schema::documentos;
use crate::validate::{normalize, required, required_id};
use crate::DbPool;

/// Transport content type for a stored document type. Unknown types fall
/// back to a generic byte stream.
pub fn content_type_for(tipo: &str) -> &'static str {
    match tipo.to_lowercase().as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Raw multipart fields, text parts still unparsed.
#[derive(Debug, Default)]
struct DocumentoForm {
    tipo_documento: Option<String>,
    nombre_documento: Option<String>,
    fecha_subida: Option<String>,
    descripcion: Option<String>,
    id_paciente: Option<String>,
    documento: Option<Vec<u8>>,
}

async fn read_form(mut payload: Multipart) -> Result<DocumentoForm, ApiError> {
    let mut form = DocumentoForm::default();
    while let Some(mut field) = payload.try_next().await.map_err(|_| ApiError::InvalidPayload)? {
        let name = field.name().to_string();
        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|_| ApiError::InvalidPayload)?;
            data.extend_from_slice(&chunk);
        }
        match name.as_str() {
            "DOCUMENTO" => form.documento = Some(data),
            "TIPO_DOCUMENTO" => form.tipo_documento = text(data)?,
            "NOMBRE_DOCUMENTO" => form.nombre_documento = text(data)?,
            "FECHA_SUBIDA" => form.fecha_subida = text(data)?,
            "DESCRIPCION" => form.descripcion = text(data)?,
            "ID_PACIENTE" => form.id_paciente = text(data)?,
            _ => {}
        }
    }
    Ok(form)
}

fn text(data: Vec<u8>) -> Result<Option<String>, ApiError> {
    String::from_utf8(data).map(Some).map_err(|_| ApiError::InvalidPayload)
}

fn parse_id_paciente(value: Option<String>) -> Result<Option<i32>, ApiError> {
    match normalize(value) {
        Some(raw) => raw
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| ApiError::InvalidField("ID_PACIENTE inválido")),
        None => Ok(None),
    }
}

fn parse_fecha_subida(value: Option<String>) -> Result<Option<NaiveDateTime>, ApiError> {
    match normalize(value) {
        Some(raw) => {
            let parsed = raw
                .parse::<NaiveDateTime>()
                .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S"))
                .or_else(|_| raw.parse::<NaiveDate>().map(|d| d.and_time(NaiveTime::MIN)))
                .map_err(|_| ApiError::InvalidField("Fecha de subida inválida"))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

impl DocumentoForm {
    fn into_insert(self) -> Result<DocumentoInsert, ApiError> {
        let tipo_documento = required(self.tipo_documento)?;
        let nombre_documento = required(self.nombre_documento)?;
        let descripcion = required(self.descripcion)?;
        let id_paciente = required_id(parse_id_paciente(self.id_paciente)?)?;
        let documento = self
            .documento
            .filter(|d| !d.is_empty())
            .ok_or(ApiError::MissingFields)?;
        let fecha_subida =
            parse_fecha_subida(self.fecha_subida)?.unwrap_or_else(|| Utc::now().naive_utc());
        Ok(DocumentoInsert {
            tipo_documento,
            nombre_documento,
            fecha_subida,
            documento,
            descripcion,
            id_paciente,
        })
    }

    fn into_changeset(self) -> Result<DocumentoChangeset, ApiError> {
        Ok(DocumentoChangeset {
            tipo_documento: normalize(self.tipo_documento),
            nombre_documento: normalize(self.nombre_documento),
            fecha_subida: parse_fecha_subida(self.fecha_subida)?,
            descripcion: normalize(self.descripcion),
            id_paciente: parse_id_paciente(self.id_paciente)?,
            documento: self.documento.filter(|d| !d.is_empty()),
        })
    }
}

/// Metadata only; binary content is served by `descargar`.
pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let rows = web::block(move || -> Result<Vec<DocumentoMeta>, ApiError> {
        let mut conn = pool.get()?;
        Ok(documentos::table
            .select((documentos::id_documento, documentos::nombre_documento))
            .load(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn get(pool: web::Data<DbPool>, path: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let info = web::block(move || -> Result<DocumentoInfo, ApiError> {
        let mut conn = pool.get()?;
        documentos::table
            .find(id)
            .select((
                documentos::id_documento,
                documentos::tipo_documento,
                documentos::nombre_documento,
                documentos::fecha_subida,
                documentos::descripcion,
                documentos::id_paciente,
            ))
            .first(&mut conn)
            .optional()?
            .ok_or(ApiError::NotFound("Documento no encontrado"))
    })
    .await??;
    Ok(HttpResponse::Ok().json(info))
}

pub async fn descargar(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let (nombre, tipo, contenido) =
        web::block(move || -> Result<(String, String, Vec<u8>), ApiError> {
            let mut conn = pool.get()?;
            documentos::table
                .find(id)
                .select((
                    documentos::nombre_documento,
                    documentos::tipo_documento,
                    documentos::documento,
                ))
                .first(&mut conn)
                .optional()?
                .ok_or(ApiError::NotFound("Documento no encontrado"))
        })
        .await??;
    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&tipo))
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{nombre}\""),
        ))
        .body(contenido))
}

pub async fn create(pool: web::Data<DbPool>, payload: Multipart) -> Result<HttpResponse, ApiError> {
    let form = read_form(payload).await?;
    let id = web::block(move || -> Result<i32, ApiError> {
        let row = form.into_insert()?;
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            verify_references(conn, &row.references())?;
            Ok(diesel::insert_into(documentos::table)
                .values(&row)
                .returning(documentos::id_documento)
                .get_result(conn)?)
        })
    })
    .await??;
    Ok(HttpResponse::Created().json(json!({ "ID_DOCUMENTO": id })))
}

pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let form = read_form(payload).await?;
    web::block(move || -> Result<(), ApiError> {
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            documentos::table
                .find(id)
                .select(documentos::id_documento)
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound("Documento no encontrado"))?;
            let cambios = form.into_changeset()?;
            if cambios.is_empty() {
                return Err(ApiError::NothingToUpdate);
            }
            verify_references(conn, &cambios.references())?;
            diesel::update(documentos::table.find(id)).set(&cambios).execute(conn)?;
            Ok(())
        })
    })
    .await??;
    Ok(HttpResponse::Ok().body("Documento actualizado exitosamente"))
}

pub async fn delete(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    web::block(move || -> Result<(), ApiError> {
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            documentos::table
                .find(id)
                .select(documentos::id_documento)
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound("Documento no encontrado"))?;
            diesel::delete(documentos::table.find(id)).execute(conn)?;
            Ok(())
        })
    })
    .await??;
    Ok(HttpResponse::Ok().body("Documento eliminado exitosamente"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_follow_the_fixed_table() {
        assert_eq!(content_type_for("pdf"), "application/pdf");
        assert_eq!(content_type_for("jpg"), "image/jpeg");
        assert_eq!(content_type_for("jpeg"), "image/jpeg");
        assert_eq!(content_type_for("png"), "image/png");
        assert_eq!(content_type_for("doc"), "application/msword");
        assert_eq!(
            content_type_for("docx"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(content_type_for("zip"), "application/octet-stream");
    }

    #[test]
    fn content_type_lookup_is_case_insensitive() {
        assert_eq!(content_type_for("PDF"), "application/pdf");
        assert_eq!(content_type_for("Png"), "image/png");
    }

    #[test]
    fn fecha_subida_accepts_common_shapes() {
        assert!(parse_fecha_subida(Some("2025-03-14T10:30:00".into())).unwrap().is_some());
        assert!(parse_fecha_subida(Some("2025-03-14 10:30:00".into())).unwrap().is_some());
        assert!(parse_fecha_subida(Some("2025-03-14".into())).unwrap().is_some());
        assert!(parse_fecha_subida(None).unwrap().is_none());
        assert!(parse_fecha_subida(Some("mañana".into())).is_err());
    }

    #[test]
    fn id_paciente_must_be_numeric() {
        assert_eq!(parse_id_paciente(Some("12".into())).unwrap(), Some(12));
        assert_eq!(parse_id_paciente(None).unwrap(), None);
        let err = parse_id_paciente(Some("doce".into())).unwrap_err();
        assert_eq!(err.to_string(), "ID_PACIENTE inválido");
    }

    #[test]
    fn upload_requires_the_file_part() {
        let form = DocumentoForm {
            tipo_documento: Some("pdf".into()),
            nombre_documento: Some("informe.pdf".into()),
            descripcion: Some("Informe anual".into()),
            id_paciente: Some("3".into()),
            documento: None,
            ..Default::default()
        };
        assert!(matches!(form.into_insert(), Err(ApiError::MissingFields)));
    }

    #[test]
    fn update_form_with_only_a_file_is_not_empty() {
        let form = DocumentoForm {
            documento: Some(vec![0x25, 0x50, 0x44, 0x46]),
            ..Default::default()
        };
        let cambios = form.into_changeset().unwrap();
        assert!(!cambios.is_empty());
        assert!(cambios.tipo_documento.is_none());
    }
}
