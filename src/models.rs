//! Row models, create-request payloads and insertable rows.
//!
//! Wire payloads use the uppercase column names clients already send
//! (`NOMBRE`, `ID_PACIENTE`, ...), mapped onto snake_case Rust fields with
//! `rename_all`. Create payloads arrive with every field optional; the
//! `into_insert` conversions enforce mandatory fields and enumerations and
//! produce the row diesel inserts.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::crypto;
use crate::errors::ApiError;
use crate::refs::RefCheck;
use crate::validate::{
    check_enum, normalize, required, required_id, INVALID_ESTADO, INVALID_ROL, INVALID_SEXO,
    INVALID_TIEMPO, VALID_ESTADO, VALID_ROLES, VALID_SEXO, VALID_TIEMPO_AVISO,
};

// ---------------------------------------------------------------------------
// Usuarios
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::usuarios)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Usuario {
    pub id_usuario: i32,
    pub nombre: String,
    pub apellidos: String,
    pub email: String,
    pub telefono: Option<String>,
    pub rol: String,
    // The hash stays server-side.
    #[serde(skip_serializing)]
    pub contrasena_hash: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NewUsuario {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub rol: Option<String>,
    pub contrasena: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::usuarios)]
pub struct UsuarioInsert {
    pub nombre: String,
    pub apellidos: String,
    pub email: String,
    pub telefono: Option<String>,
    pub rol: String,
    pub contrasena_hash: String,
}

impl NewUsuario {
    pub fn into_insert(self) -> Result<UsuarioInsert, ApiError> {
        let nombre = required(self.nombre)?;
        let apellidos = required(self.apellidos)?;
        let email = required(self.email)?;
        let rol = required(self.rol)?;
        let contrasena = required(self.contrasena)?;
        check_enum(&rol, VALID_ROLES, INVALID_ROL)?;
        let contrasena_hash = crypto::hash_password(&contrasena)?;
        Ok(UsuarioInsert {
            nombre,
            apellidos,
            email,
            telefono: normalize(self.telefono),
            rol,
            contrasena_hash,
        })
    }
}

// ---------------------------------------------------------------------------
// Pacientes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::pacientes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Paciente {
    pub id_paciente: i32,
    pub nombre: String,
    pub apellidos: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub alerta_paciente: Option<String>,
    pub sexo: Option<String>,
    pub peso_kg: Option<f64>,
    pub direccion: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NewPaciente {
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

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::pacientes)]
pub struct PacienteInsert {
    pub nombre: String,
    pub apellidos: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub fecha_nacimiento: Option<NaiveDate>,
    pub alerta_paciente: Option<String>,
    pub sexo: Option<String>,
    pub peso_kg: Option<f64>,
    pub direccion: Option<String>,
}

impl NewPaciente {
    pub fn into_insert(self) -> Result<PacienteInsert, ApiError> {
        let nombre = required(self.nombre)?;
        let apellidos = required(self.apellidos)?;
        let sexo = normalize(self.sexo);
        if let Some(s) = sexo.as_deref() {
            check_enum(s, VALID_SEXO, INVALID_SEXO)?;
        }
        Ok(PacienteInsert {
            nombre,
            apellidos,
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

// ---------------------------------------------------------------------------
// Citas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::citas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Cita {
    pub id_cita: i32,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub estado: String,
    pub notas_adicionales: Option<String>,
    pub tiempo_antes_cita_dias: Option<String>,
    pub id_paciente: i32,
    pub id_usuario: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NewCita {
    pub fecha: Option<NaiveDate>,
    pub hora: Option<NaiveTime>,
    pub estado: Option<String>,
    pub notas_adicionales: Option<String>,
    pub tiempo_antes_cita_dias: Option<String>,
    pub id_paciente: Option<i32>,
    pub id_usuario: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::citas)]
pub struct CitaInsert {
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub estado: String,
    pub notas_adicionales: Option<String>,
    pub tiempo_antes_cita_dias: Option<String>,
    pub id_paciente: i32,
    pub id_usuario: i32,
}

impl NewCita {
    pub fn into_insert(self) -> Result<CitaInsert, ApiError> {
        let fecha = self.fecha.ok_or(ApiError::MissingFields)?;
        let hora = self.hora.ok_or(ApiError::MissingFields)?;
        let estado = required(self.estado)?;
        let id_paciente = required_id(self.id_paciente)?;
        let id_usuario = required_id(self.id_usuario)?;
        check_enum(&estado, VALID_ESTADO, INVALID_ESTADO)?;
        let tiempo = normalize(self.tiempo_antes_cita_dias);
        if let Some(t) = tiempo.as_deref() {
            check_enum(t, VALID_TIEMPO_AVISO, INVALID_TIEMPO)?;
        }
        Ok(CitaInsert {
            fecha,
            hora,
            estado,
            notas_adicionales: normalize(self.notas_adicionales),
            tiempo_antes_cita_dias: tiempo,
            id_paciente,
            id_usuario,
        })
    }
}

impl CitaInsert {
    /// Reference checks for this row, in validation order.
    pub fn references(&self) -> Vec<RefCheck> {
        vec![
            RefCheck::paciente(self.id_paciente),
            RefCheck::usuario(self.id_usuario),
        ]
    }
}

// ---------------------------------------------------------------------------
// Consultas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::consultas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Consulta {
    pub id_consulta: i32,
    pub fecha_hora: NaiveDateTime,
    pub exploracion_medica: Option<String>,
    pub exploracion_fisica: Option<String>,
    pub diagnostico: Option<String>,
    pub cobro_consulta: Option<f64>,
    pub id_paciente: i32,
    pub id_usuario: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NewConsulta {
    pub fecha_hora: Option<NaiveDateTime>,
    pub exploracion_medica: Option<String>,
    pub exploracion_fisica: Option<String>,
    pub diagnostico: Option<String>,
    pub cobro_consulta: Option<f64>,
    pub id_paciente: Option<i32>,
    pub id_usuario: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::consultas)]
pub struct ConsultaInsert {
    pub fecha_hora: NaiveDateTime,
    pub exploracion_medica: Option<String>,
    pub exploracion_fisica: Option<String>,
    pub diagnostico: Option<String>,
    pub cobro_consulta: Option<f64>,
    pub id_paciente: i32,
    pub id_usuario: i32,
}

impl NewConsulta {
    pub fn into_insert(self) -> Result<ConsultaInsert, ApiError> {
        let fecha_hora = self.fecha_hora.ok_or(ApiError::MissingFields)?;
        let id_paciente = required_id(self.id_paciente)?;
        let id_usuario = required_id(self.id_usuario)?;
        Ok(ConsultaInsert {
            fecha_hora,
            exploracion_medica: normalize(self.exploracion_medica),
            exploracion_fisica: normalize(self.exploracion_fisica),
            diagnostico: normalize(self.diagnostico),
            cobro_consulta: self.cobro_consulta,
            id_paciente,
            id_usuario,
        })
    }
}

impl ConsultaInsert {
    pub fn references(&self) -> Vec<RefCheck> {
        vec![
            RefCheck::paciente(self.id_paciente),
            RefCheck::usuario(self.id_usuario),
        ]
    }
}

// ---------------------------------------------------------------------------
// Recetas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::recetas)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Receta {
    pub id_receta: i32,
    pub contenido: String,
    pub fecha_emision: NaiveDate,
    pub id_consulta: Option<i32>,
    pub id_usuario: i32,
    pub id_paciente: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NewReceta {
    pub contenido: Option<String>,
    pub fecha_emision: Option<NaiveDate>,
    pub id_consulta: Option<i32>,
    pub id_usuario: Option<i32>,
    pub id_paciente: Option<i32>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::recetas)]
pub struct RecetaInsert {
    pub contenido: String,
    pub fecha_emision: NaiveDate,
    pub id_consulta: Option<i32>,
    pub id_usuario: i32,
    pub id_paciente: i32,
}

impl NewReceta {
    pub fn into_insert(self) -> Result<RecetaInsert, ApiError> {
        let contenido = required(self.contenido)?;
        let fecha_emision = self.fecha_emision.ok_or(ApiError::MissingFields)?;
        let id_usuario = required_id(self.id_usuario)?;
        let id_paciente = required_id(self.id_paciente)?;
        Ok(RecetaInsert {
            contenido,
            fecha_emision,
            id_consulta: self.id_consulta,
            id_usuario,
            id_paciente,
        })
    }
}

impl RecetaInsert {
    /// Mandatory references first, the optional consultation last.
    pub fn references(&self) -> Vec<RefCheck> {
        let mut checks = vec![
            RefCheck::paciente(self.id_paciente),
            RefCheck::usuario(self.id_usuario),
        ];
        if let Some(id) = self.id_consulta {
            checks.push(RefCheck::consulta(id));
        }
        checks
    }
}

// ---------------------------------------------------------------------------
// Documentos
// ---------------------------------------------------------------------------

/// Listing shape: binary content stays out of the metadata endpoint.
#[derive(Debug, Clone, Queryable, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DocumentoMeta {
    pub id_documento: i32,
    pub nombre_documento: String,
}

/// Full row minus the binary payload, for get-by-id.
#[derive(Debug, Clone, Queryable, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DocumentoInfo {
    pub id_documento: i32,
    pub tipo_documento: String,
    pub nombre_documento: String,
    pub fecha_subida: NaiveDateTime,
    pub descripcion: String,
    pub id_paciente: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::documentos)]
pub struct DocumentoInsert {
    pub tipo_documento: String,
    pub nombre_documento: String,
    pub fecha_subida: NaiveDateTime,
    pub documento: Vec<u8>,
    pub descripcion: String,
    pub id_paciente: i32,
}

impl DocumentoInsert {
    pub fn references(&self) -> Vec<RefCheck> {
        vec![RefCheck::paciente(self.id_paciente)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::RefKind;

    #[test]
    fn usuario_requires_all_mandatory_fields() {
        let payload = NewUsuario {
            nombre: Some("Ana".into()),
            apellidos: Some("Lopez".into()),
            email: None,
            ..Default::default()
        };
        assert!(matches!(payload.into_insert(), Err(ApiError::MissingFields)));
    }

    #[test]
    fn usuario_rejects_unknown_role() {
        let payload = NewUsuario {
            nombre: Some("Ana".into()),
            apellidos: Some("Lopez".into()),
            email: Some("ana@clinica.es".into()),
            rol: Some("GERENTE".into()),
            contrasena: Some("secreta".into()),
            ..Default::default()
        };
        let err = payload.into_insert().unwrap_err();
        assert_eq!(err.to_string(), "Rol inválido");
    }

    #[test]
    fn usuario_insert_carries_a_hash_not_the_plaintext() {
        let payload = NewUsuario {
            nombre: Some("Ana".into()),
            apellidos: Some("Lopez".into()),
            email: Some("ana@clinica.es".into()),
            rol: Some("MEDICO".into()),
            contrasena: Some("secreta".into()),
            ..Default::default()
        };
        let row = payload.into_insert().unwrap();
        assert_ne!(row.contrasena_hash, "secreta");
        assert!(bcrypt::verify("secreta", &row.contrasena_hash).unwrap());
    }

    #[test]
    fn usuario_serialization_hides_the_hash() {
        let usuario = Usuario {
            id_usuario: 1,
            nombre: "Ana".into(),
            apellidos: "Lopez".into(),
            email: "ana@clinica.es".into(),
            telefono: None,
            rol: "MEDICO".into(),
            contrasena_hash: "$2b$10$xyz".into(),
        };
        let json = serde_json::to_value(&usuario).unwrap();
        assert_eq!(json["NOMBRE"], "Ana");
        assert!(json.get("CONTRASENA_HASH").is_none());
    }

    #[test]
    fn paciente_without_sexo_is_valid() {
        let payload = NewPaciente {
            nombre: Some("Ana".into()),
            apellidos: Some("Lopez".into()),
            ..Default::default()
        };
        let row = payload.into_insert().unwrap();
        assert_eq!(row.sexo, None);
    }

    #[test]
    fn paciente_rejects_unknown_sexo() {
        let payload = NewPaciente {
            nombre: Some("Ana".into()),
            apellidos: Some("Lopez".into()),
            sexo: Some("X".into()),
            ..Default::default()
        };
        let err = payload.into_insert().unwrap_err();
        assert_eq!(err.to_string(), "Sexo inválido");
    }

    #[test]
    fn cita_estado_is_checked_before_tiempo() {
        let payload = NewCita {
            fecha: Some(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
            hora: Some(NaiveTime::from_hms_opt(10, 30, 0).unwrap()),
            estado: Some("PENDIENTE".into()),
            tiempo_antes_cita_dias: Some("9D".into()),
            id_paciente: Some(1),
            id_usuario: Some(1),
            ..Default::default()
        };
        let err = payload.into_insert().unwrap_err();
        assert_eq!(err.to_string(), "Estado inválido");
    }

    #[test]
    fn cita_references_in_order() {
        let payload = NewCita {
            fecha: Some(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
            hora: Some(NaiveTime::from_hms_opt(10, 30, 0).unwrap()),
            estado: Some("ACTIVO".into()),
            id_paciente: Some(7),
            id_usuario: Some(2),
            ..Default::default()
        };
        let row = payload.into_insert().unwrap();
        assert_eq!(
            row.references(),
            vec![RefCheck::paciente(7), RefCheck::usuario(2)]
        );
    }

    #[test]
    fn receta_consulta_reference_only_when_present() {
        let base = NewReceta {
            contenido: Some("Ibuprofeno 600mg".into()),
            fecha_emision: Some(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
            id_usuario: Some(2),
            id_paciente: Some(7),
            id_consulta: None,
        };
        let row = base.into_insert().unwrap();
        assert_eq!(row.references().len(), 2);

        let con_consulta = NewReceta {
            contenido: Some("Ibuprofeno 600mg".into()),
            fecha_emision: Some(NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()),
            id_usuario: Some(2),
            id_paciente: Some(7),
            id_consulta: Some(4),
        };
        let row = con_consulta.into_insert().unwrap();
        assert_eq!(row.references().last().unwrap().kind, RefKind::Consulta);
    }

    #[test]
    fn wire_keys_are_screaming_snake_case() {
        let payload: NewCita = serde_json::from_str(
            r#"{
                "FECHA": "2025-03-14",
                "HORA": "10:30:00",
                "ESTADO": "ACTIVO",
                "ID_PACIENTE": 7,
                "ID_USUARIO": 2
            }"#,
        )
        .unwrap();
        assert_eq!(payload.estado.as_deref(), Some("ACTIVO"));
        assert_eq!(payload.id_paciente, Some(7));
    }
}
