//! Partial updates.
//!
//! Each entity has an update payload with every field optional and a diesel
//! changeset holding only the columns that were actually submitted. The
//! `into_changeset` conversions collect fields in the wire's declared order,
//! validating enumerated values eagerly as they go; reference fields are
//! gathered afterwards with `references()` and confirmed as a batch once the
//! column set is complete. Empty submissions are dropped, so a client cannot
//! clear a column by sending `""`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::AsChangeset;
use serde::Deserialize;

use crate::crypto;
use crate::errors::ApiError;
use crate::refs::RefCheck;
use crate::validate::{
    check_enum, normalize, INVALID_ESTADO, INVALID_ROL, INVALID_SEXO, INVALID_TIEMPO,
    VALID_ESTADO, VALID_ROLES, VALID_SEXO, VALID_TIEMPO_AVISO,
};

// ---------------------------------------------------------------------------
// Usuarios
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct UsuarioUpdate {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub rol: Option<String>,
    pub contrasena: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::usuarios)]
pub struct UsuarioChangeset {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub rol: Option<String>,
    pub contrasena_hash: Option<String>,
}

impl UsuarioUpdate {
    pub fn into_changeset(self) -> Result<UsuarioChangeset, ApiError> {
        let rol = normalize(self.rol);
        if let Some(r) = rol.as_deref() {
            check_enum(r, VALID_ROLES, INVALID_ROL)?;
        }
        let contrasena_hash = match normalize(self.contrasena) {
            Some(plain) => Some(crypto::hash_password(&plain)?),
            None => None,
        };
        Ok(UsuarioChangeset {
            nombre: normalize(self.nombre),
            apellidos: normalize(self.apellidos),
            email: normalize(self.email),
            telefono: normalize(self.telefono),
            rol,
            contrasena_hash,
        })
    }
}

impl UsuarioChangeset {
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.apellidos.is_none()
            && self.email.is_none()
            && self.telefono.is_none()
            && self.rol.is_none()
            && self.contrasena_hash.is_none()
    }
}

// ---------------------------------------------------------------------------
// Pacientes
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PacienteUpdate {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub alerta_paciente: Option<String>,
    pub sexo: Option<String>,
    pub peso_kg: Option<f64>,
    pub direccion: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::pacientes)]
pub struct PacienteChangeset {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub alerta_paciente: Option<String>,
    pub sexo: Option<String>,
    pub peso_kg: Option<f64>,
    pub direccion: Option<String>,
}

impl PacienteUpdate {
    pub fn into_changeset(self) -> Result<PacienteChangeset, ApiError> {
        let sexo = normalize(self.sexo);
        if let Some(s) = sexo.as_deref() {
            check_enum(s, VALID_SEXO, INVALID_SEXO)?;
        }
        Ok(PacienteChangeset {
            nombre: normalize(self.nombre),
            apellidos: normalize(self.apellidos),
            email: normalize(self.email),
            telefono: normalize(self.telefono),
            fecha_nacimiento: self.fecha_nacimiento,
            alerta_paciente: normalize(self.alerta_paciente),
            sexo,
            peso_kg: self.peso_kg,
            direccion: normalize(self.direccion),
        })
    }
}

impl PacienteChangeset {
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.apellidos.is_none()
            && self.email.is_none()
            && self.telefono.is_none()
            && self.fecha_nacimiento.is_none()
            && self.alerta_paciente.is_none()
            && self.sexo.is_none()
            && self.peso_kg.is_none()
            && self.direccion.is_none()
    }
}

// ---------------------------------------------------------------------------
// Citas
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CitaUpdate {
    pub fecha: Option<NaiveDate>,
    pub hora: Option<NaiveTime>,
    pub estado: Option<String>,
    pub notas_adicionales: Option<String>,
    pub tiempo_antes_cita_dias: Option<String>,
    pub id_paciente: Option<i32>,
    pub id_usuario: Option<i32>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::citas)]
pub struct CitaChangeset {
    pub fecha: Option<NaiveDate>,
    pub hora: Option<NaiveTime>,
    pub estado: Option<String>,
    pub notas_adicionales: Option<String>,
    pub tiempo_antes_cita_dias: Option<String>,
    pub id_paciente: Option<i32>,
    pub id_usuario: Option<i32>,
}

impl CitaUpdate {
    pub fn into_changeset(self) -> Result<CitaChangeset, ApiError> {
        let estado = normalize(self.estado);
        if let Some(e) = estado.as_deref() {
            check_enum(e, VALID_ESTADO, INVALID_ESTADO)?;
        }
        let tiempo = normalize(self.tiempo_antes_cita_dias);
        if let Some(t) = tiempo.as_deref() {
            check_enum(t, VALID_TIEMPO_AVISO, INVALID_TIEMPO)?;
        }
        Ok(CitaChangeset {
            fecha: self.fecha,
            hora: self.hora,
            estado,
            notas_adicionales: normalize(self.notas_adicionales),
            tiempo_antes_cita_dias: tiempo,
            id_paciente: self.id_paciente,
            id_usuario: self.id_usuario,
        })
    }
}

impl CitaChangeset {
    pub fn is_empty(&self) -> bool {
        self.fecha.is_none()
            && self.hora.is_none()
            && self.estado.is_none()
            && self.notas_adicionales.is_none()
            && self.tiempo_antes_cita_dias.is_none()
            && self.id_paciente.is_none()
            && self.id_usuario.is_none()
    }

    /// Reference checks for the references this update includes.
    pub fn references(&self) -> Vec<RefCheck> {
        let mut checks = Vec::new();
        if let Some(id) = self.id_paciente {
            checks.push(RefCheck::paciente(id));
        }
        if let Some(id) = self.id_usuario {
            checks.push(RefCheck::usuario(id));
        }
        checks
    }
}

// ---------------------------------------------------------------------------
// Consultas
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ConsultaUpdate {
    pub fecha_hora: Option<NaiveDateTime>,
    pub exploracion_medica: Option<String>,
    pub exploracion_fisica: Option<String>,
    pub diagnostico: Option<String>,
    pub cobro_consulta: Option<f64>,
    pub id_paciente: Option<i32>,
    pub id_usuario: Option<i32>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::consultas)]
pub struct ConsultaChangeset {
    pub fecha_hora: Option<NaiveDateTime>,
    pub exploracion_medica: Option<String>,
    pub exploracion_fisica: Option<String>,
    pub diagnostico: Option<String>,
    pub cobro_consulta: Option<f64>,
    pub id_paciente: Option<i32>,
    pub id_usuario: Option<i32>,
}

impl ConsultaUpdate {
    pub fn into_changeset(self) -> ConsultaChangeset {
        ConsultaChangeset {
            fecha_hora: self.fecha_hora,
            exploracion_medica: normalize(self.exploracion_medica),
            exploracion_fisica: normalize(self.exploracion_fisica),
            diagnostico: normalize(self.diagnostico),
            cobro_consulta: self.cobro_consulta,
            id_paciente: self.id_paciente,
            id_usuario: self.id_usuario,
        }
    }
}

impl ConsultaChangeset {
    pub fn is_empty(&self) -> bool {
        self.fecha_hora.is_none()
            && self.exploracion_medica.is_none()
            && self.exploracion_fisica.is_none()
            && self.diagnostico.is_none()
            && self.cobro_consulta.is_none()
            && self.id_paciente.is_none()
            && self.id_usuario.is_none()
    }

    pub fn references(&self) -> Vec<RefCheck> {
        let mut checks = Vec::new();
        if let Some(id) = self.id_paciente {
            checks.push(RefCheck::paciente(id));
        }
        if let Some(id) = self.id_usuario {
            checks.push(RefCheck::usuario(id));
        }
        checks
    }
}

// ---------------------------------------------------------------------------
// Recetas
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RecetaUpdate {
    pub contenido: Option<String>,
    pub fecha_emision: Option<NaiveDate>,
    pub id_consulta: Option<i32>,
    pub id_usuario: Option<i32>,
    pub id_paciente: Option<i32>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::recetas)]
pub struct RecetaChangeset {
    pub contenido: Option<String>,
    pub fecha_emision: Option<NaiveDate>,
    pub id_consulta: Option<i32>,
    pub id_usuario: Option<i32>,
    pub id_paciente: Option<i32>,
}

impl RecetaUpdate {
    pub fn into_changeset(self) -> RecetaChangeset {
        RecetaChangeset {
            contenido: normalize(self.contenido),
            fecha_emision: self.fecha_emision,
            id_consulta: self.id_consulta,
            id_usuario: self.id_usuario,
            id_paciente: self.id_paciente,
        }
    }
}

impl RecetaChangeset {
    pub fn is_empty(&self) -> bool {
        self.contenido.is_none()
            && self.fecha_emision.is_none()
            && self.id_consulta.is_none()
            && self.id_usuario.is_none()
            && self.id_paciente.is_none()
    }

    pub fn references(&self) -> Vec<RefCheck> {
        let mut checks = Vec::new();
        if let Some(id) = self.id_paciente {
            checks.push(RefCheck::paciente(id));
        }
        if let Some(id) = self.id_usuario {
            checks.push(RefCheck::usuario(id));
        }
        if let Some(id) = self.id_consulta {
            checks.push(RefCheck::consulta(id));
        }
        checks
    }
}

// ---------------------------------------------------------------------------
// Documentos
// ---------------------------------------------------------------------------

/// Built by the documents handler from the multipart form; the file part,
/// when present, replaces the stored bytes like any other column.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = crate::schema::documentos)]
pub struct DocumentoChangeset {
    pub tipo_documento: Option<String>,
    pub nombre_documento: Option<String>,
    pub fecha_subida: Option<NaiveDateTime>,
    pub descripcion: Option<String>,
    pub id_paciente: Option<i32>,
    pub documento: Option<Vec<u8>>,
}

impl DocumentoChangeset {
    pub fn is_empty(&self) -> bool {
        self.tipo_documento.is_none()
            && self.nombre_documento.is_none()
            && self.fecha_subida.is_none()
            && self.descripcion.is_none()
            && self.id_paciente.is_none()
            && self.documento.is_none()
    }

    pub fn references(&self) -> Vec<RefCheck> {
        match self.id_paciente {
            Some(id) => vec![RefCheck::paciente(id)],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::RefKind;

    #[test]
    fn empty_payload_builds_an_empty_changeset() {
        let cambios = UsuarioUpdate::default().into_changeset().unwrap();
        assert!(cambios.is_empty());
    }

    #[test]
    fn empty_strings_are_ignored_not_applied() {
        let payload = PacienteUpdate {
            nombre: Some(String::new()),
            direccion: Some(String::new()),
            ..Default::default()
        };
        let cambios = payload.into_changeset().unwrap();
        assert!(cambios.is_empty());
    }

    #[test]
    fn single_field_update_touches_one_column() {
        let payload = PacienteUpdate {
            telefono: Some("600111222".into()),
            ..Default::default()
        };
        let cambios = payload.into_changeset().unwrap();
        assert!(!cambios.is_empty());
        assert_eq!(cambios.telefono.as_deref(), Some("600111222"));
        assert!(cambios.nombre.is_none());
        assert!(cambios.sexo.is_none());
    }

    #[test]
    fn invalid_rol_aborts_the_whole_update() {
        let payload = UsuarioUpdate {
            nombre: Some("Ana".into()),
            rol: Some("BECARIO".into()),
            ..Default::default()
        };
        let err = payload.into_changeset().unwrap_err();
        assert_eq!(err.to_string(), "Rol inválido");
    }

    #[test]
    fn estado_is_validated_before_tiempo() {
        let payload = CitaUpdate {
            estado: Some("PENDIENTE".into()),
            tiempo_antes_cita_dias: Some("9D".into()),
            ..Default::default()
        };
        let err = payload.into_changeset().unwrap_err();
        assert_eq!(err.to_string(), "Estado inválido");
    }

    #[test]
    fn contrasena_is_hashed_into_the_changeset() {
        let payload = UsuarioUpdate {
            contrasena: Some("nueva-clave".into()),
            ..Default::default()
        };
        let cambios = payload.into_changeset().unwrap();
        let hash = cambios.contrasena_hash.unwrap();
        assert_ne!(hash, "nueva-clave");
        assert!(bcrypt::verify("nueva-clave", &hash).unwrap());
    }

    #[test]
    fn references_cover_only_included_fields() {
        let payload = CitaUpdate {
            id_usuario: Some(5),
            ..Default::default()
        };
        let cambios = payload.into_changeset().unwrap();
        assert_eq!(cambios.references(), vec![RefCheck::usuario(5)]);
    }

    #[test]
    fn receta_references_keep_paciente_usuario_consulta_order() {
        let payload = RecetaUpdate {
            id_consulta: Some(3),
            id_usuario: Some(2),
            id_paciente: Some(1),
            ..Default::default()
        };
        let cambios = payload.into_changeset();
        let kinds: Vec<RefKind> = cambios.references().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![RefKind::Paciente, RefKind::Usuario, RefKind::Consulta]);
    }

    #[test]
    fn update_payloads_accept_wire_keys() {
        let payload: CitaUpdate = serde_json::from_str(
            r#"{"ESTADO": "CANCELADO", "NOTAS_ADICIONALES": "aviso telefónico"}"#,
        )
        .unwrap();
        let cambios = payload.into_changeset().unwrap();
        assert_eq!(cambios.estado.as_deref(), Some("CANCELADO"));
        assert_eq!(cambios.notas_adicionales.as_deref(), Some("aviso telefónico"));
    }
}
