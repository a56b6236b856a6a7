//! Appointment endpoints.

use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde_json::json;

use crate::errors::ApiError;
use crate::models::{Cita, NewCita};
use crate::patch::CitaUpdate;
use crate::refs::verify_references;
use crate::schema::citas;
use crate::DbPool;

pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let rows = web::block(move || -> Result<Vec<Cita>, ApiError> {
        let mut conn = pool.get()?;
        Ok(citas::table.select(Cita::as_select()).load(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn by_paciente(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let rows = web::block(move || -> Result<Vec<Cita>, ApiError> {
        let mut conn = pool.get()?;
        Ok(citas::table
            .filter(citas::id_paciente.eq(id))
            .select(Cita::as_select())
            .load(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn get(pool: web::Data<DbPool>, path: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let cita = web::block(move || -> Result<Cita, ApiError> {
        let mut conn = pool.get()?;
        citas::table
            .find(id)
            .select(Cita::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(ApiError::NotFound("Cita no encontrada"))
    })
    .await??;
    Ok(HttpResponse::Ok().json(cita))
}

pub async fn create(
    pool: web::Data<DbPool>,
    body: web::Json<NewCita>,
) -> Result<HttpResponse, ApiError> {
    let datos = body.into_inner();
    let id = web::block(move || -> Result<i32, ApiError> {
        let row = datos.into_insert()?;
        let mut conn = pool.get()?;
        // References are confirmed and the row inserted as one unit.
        conn.transaction(|conn| {
            verify_references(conn, &row.references())?;
            Ok(diesel::insert_into(citas::table)
                .values(&row)
                .returning(citas::id_cita)
                .get_result(conn)?)
        })
    })
    .await??;
    Ok(HttpResponse::Created().json(json!({ "ID_CITA": id })))
}

pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<CitaUpdate>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let datos = body.into_inner();
    web::block(move || -> Result<(), ApiError> {
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            citas::table
                .find(id)
                .select(citas::id_cita)
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound("Cita no encontrada"))?;
            let cambios = datos.into_changeset()?;
            if cambios.is_empty() {
                return Err(ApiError::NothingToUpdate);
            }
            verify_references(conn, &cambios.references())?;
            diesel::update(citas::table.find(id)).set(&cambios).execute(conn)?;
            Ok(())
        })
    })
    .await??;
    Ok(HttpResponse::Ok().body("Cita actualizada exitosamente"))
}

pub async fn delete(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    web::block(move || -> Result<(), ApiError> {
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            citas::table
                .find(id)
                .select(citas::id_cita)
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound("Cita no encontrada"))?;
            diesel::delete(citas::table.find(id)).execute(conn)?;
            Ok(())
        })
    })
    .await??;
    Ok(HttpResponse::Ok().body("Cita eliminada exitosamente"))
}
