//! Patient endpoints.

use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::json;

use crate::errors::ApiError;
use crate::models::{NewPaciente, Paciente};
use crate::patch::PacienteUpdate;
use crate::schema::pacientes;
use crate::DbPool;

pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let rows = web::block(move || -> Result<Vec<Paciente>, ApiError> {
        let mut conn = pool.get()?;
        Ok(pacientes::table.select(Paciente::as_select()).load(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn get(pool: web::Data<DbPool>, path: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let paciente = web::block(move || -> Result<Paciente, ApiError> {
        let mut conn = pool.get()?;
        pacientes::table
            .find(id)
            .select(Paciente::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(ApiError::NotFound("Paciente no encontrado"))
    })
    .await??;
    Ok(HttpResponse::Ok().json(paciente))
}

pub async fn create(
    pool: web::Data<DbPool>,
    body: web::Json<NewPaciente>,
) -> Result<HttpResponse, ApiError> {
    let datos = body.into_inner();
    let id = web::block(move || -> Result<i32, ApiError> {
        let row = datos.into_insert()?;
        let mut conn = pool.get()?;
        Ok(diesel::insert_into(pacientes::table)
            .values(&row)
            .returning(pacientes::id_paciente)
            .get_result(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Created().json(json!({ "ID_PACIENTE": id })))
}

pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<PacienteUpdate>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let datos = body.into_inner();
    web::block(move || -> Result<(), ApiError> {
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            pacientes::table
                .find(id)
                .select(pacientes::id_paciente)
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound("Paciente no encontrado"))?;
            let cambios = datos.into_changeset()?;
            if cambios.is_empty() {
                return Err(ApiError::NothingToUpdate);
            }
            diesel::update(pacientes::table.find(id)).set(&cambios).execute(conn)?;
            Ok(())
        })
    })
    .await??;
    Ok(HttpResponse::Ok().body("Paciente actualizado exitosamente"))
}

pub async fn delete(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    web::block(move || -> Result<(), ApiError> {
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            pacientes::table
                .find(id)
                .select(pacientes::id_paciente)
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound("Paciente no encontrado"))?;
            match diesel::delete(pacientes::table.find(id)).execute(conn) {
                Ok(_) => Ok(()),
                Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                    Err(ApiError::DependencyConflict(
                        "No se puede eliminar el paciente porque tiene registros asociados.",
                    ))
                }
                Err(err) => Err(err.into()),
            }
        })
    })
    .await??;
    Ok(HttpResponse::Ok().body("Paciente eliminado exitosamente"))
}
