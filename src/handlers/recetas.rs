//! Prescription endpoints.

use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde_json::json;

use crate::errors::ApiError;
use crate::models::{NewReceta, Receta};
use crate::patch::RecetaUpdate;
use crate::refs::verify_references;
use crate::schema::recetas;
use crate::DbPool;

pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let rows = web::block(move || -> Result<Vec<Receta>, ApiError> {
        let mut conn = pool.get()?;
        Ok(recetas::table.select(Receta::as_select()).load(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn by_paciente(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let rows = web::block(move || -> Result<Vec<Receta>, ApiError> {
        let mut conn = pool.get()?;
        Ok(recetas::table
            .filter(recetas::id_paciente.eq(id))
            .select(Receta::as_select())
            .load(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn by_consulta(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let rows = web::block(move || -> Result<Vec<Receta>, ApiError> {
        let mut conn = pool.get()?;
        Ok(recetas::table
            .filter(recetas::id_consulta.eq(id))
            .select(Receta::as_select())
            .load(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Ok().json(rows))
}

/// Prescriptions issued by one staff user.
pub async fn by_medico(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let rows = web::block(move || -> Result<Vec<Receta>, ApiError> {
        let mut conn = pool.get()?;
        Ok(recetas::table
            .filter(recetas::id_usuario.eq(id))
            .select(Receta::as_select())
            .load(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn get(pool: web::Data<DbPool>, path: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let receta = web::block(move || -> Result<Receta, ApiError> {
        let mut conn = pool.get()?;
        recetas::table
            .find(id)
            .select(Receta::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(ApiError::NotFound("Receta no encontrada"))
    })
    .await??;
    Ok(HttpResponse::Ok().json(receta))
}

pub async fn create(
    pool: web::Data<DbPool>,
    body: web::Json<NewReceta>,
) -> Result<HttpResponse, ApiError> {
    let datos = body.into_inner();
    let id = web::block(move || -> Result<i32, ApiError> {
        let row = datos.into_insert()?;
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            verify_references(conn, &row.references())?;
            Ok(diesel::insert_into(recetas::table)
                .values(&row)
                .returning(recetas::id_receta)
                .get_result(conn)?)
        })
    })
    .await??;
    Ok(HttpResponse::Created().json(json!({ "ID_RECETA": id })))
}

pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<RecetaUpdate>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let datos = body.into_inner();
    web::block(move || -> Result<(), ApiError> {
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            recetas::table
                .find(id)
                .select(recetas::id_receta)
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound("Receta no encontrada"))?;
            let cambios = datos.into_changeset();
            if cambios.is_empty() {
                return Err(ApiError::NothingToUpdate);
            }
            verify_references(conn, &cambios.references())?;
            diesel::update(recetas::table.find(id)).set(&cambios).execute(conn)?;
            Ok(())
        })
    })
    .await??;
    Ok(HttpResponse::Ok().body("Receta actualizada exitosamente"))
}

pub async fn delete(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    web::block(move || -> Result<(), ApiError> {
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            recetas::table
                .find(id)
                .select(recetas::id_receta)
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound("Receta no encontrada"))?;
            diesel::delete(recetas::table.find(id)).execute(conn)?;
            Ok(())
        })
    })
    .await??;
    Ok(HttpResponse::Ok().body("Receta eliminada exitosamente"))
}
