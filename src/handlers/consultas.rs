//! Consultation endpoints.
//!
//! Deleting a consultation also removes its prescriptions; both deletes run
//! in the same transaction so the cascade is all-or-nothing.

use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde_json::json;

use crate::errors::ApiError;
use crate::models::{Consulta, NewConsulta};
use crate::patch::ConsultaUpdate;
use crate::refs::verify_references;
use crate::schema::{consultas, recetas};
use crate::DbPool;

pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let rows = web::block(move || -> Result<Vec<Consulta>, ApiError> {
        let mut conn = pool.get()?;
        Ok(consultas::table.select(Consulta::as_select()).load(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn by_paciente(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let rows = web::block(move || -> Result<Vec<Consulta>, ApiError> {
        let mut conn = pool.get()?;
        Ok(consultas::table
            .filter(consultas::id_paciente.eq(id))
            .select(Consulta::as_select())
            .load(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn get(pool: web::Data<DbPool>, path: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let consulta = web::block(move || -> Result<Consulta, ApiError> {
        let mut conn = pool.get()?;
        consultas::table
            .find(id)
            .select(Consulta::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(ApiError::NotFound("Consulta no encontrada"))
    })
    .await??;
    Ok(HttpResponse::Ok().json(consulta))
}

pub async fn create(
    pool: web::Data<DbPool>,
    body: web::Json<NewConsulta>,
) -> Result<HttpResponse, ApiError> {
    let datos = body.into_inner();
    let id = web::block(move || -> Result<i32, ApiError> {
        let row = datos.into_insert()?;
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            verify_references(conn, &row.references())?;
            Ok(diesel::insert_into(consultas::table)
                .values(&row)
                .returning(consultas::id_consulta)
                .get_result(conn)?)
        })
    })
    .await??;
    Ok(HttpResponse::Created().json(json!({ "ID_CONSULTA": id })))
}

pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<ConsultaUpdate>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let datos = body.into_inner();
    web::block(move || -> Result<(), ApiError> {
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            consultas::table
                .find(id)
                .select(consultas::id_consulta)
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound("Consulta no encontrada"))?;
            let cambios = datos.into_changeset();
            if cambios.is_empty() {
                return Err(ApiError::NothingToUpdate);
            }
            verify_references(conn, &cambios.references())?;
            diesel::update(consultas::table.find(id)).set(&cambios).execute(conn)?;
            Ok(())
        })
    })
    .await??;
    Ok(HttpResponse::Ok().body("Consulta actualizada exitosamente"))
}

pub async fn delete(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    web::block(move || -> Result<(), ApiError> {
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            consultas::table
                .find(id)
                .select(consultas::id_consulta)
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound("Consulta no encontrada"))?;
            // Dependent prescriptions go first, then the consultation.
            diesel::delete(recetas::table.filter(recetas::id_consulta.eq(id))).execute(conn)?;
            diesel::delete(consultas::table.find(id)).execute(conn)?;
            Ok(())
        })
    })
    .await??;
    Ok(HttpResponse::Ok().body("Consulta y recetas asociadas eliminadas exitosamente"))
}
