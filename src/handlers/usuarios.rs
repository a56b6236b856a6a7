//! Staff user endpoints.

use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde_json::json;

use crate::errors::ApiError;
use crate::models::{NewUsuario, Usuario};
use crate::patch::UsuarioUpdate;
use crate::schema::usuarios;
use crate::DbPool;

pub async fn list(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let rows = web::block(move || -> Result<Vec<Usuario>, ApiError> {
        let mut conn = pool.get()?;
        Ok(usuarios::table.select(Usuario::as_select()).load(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Ok().json(rows))
}

pub async fn get(pool: web::Data<DbPool>, path: web::Path<i32>) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let usuario = web::block(move || -> Result<Usuario, ApiError> {
        let mut conn = pool.get()?;
        usuarios::table
            .find(id)
            .select(Usuario::as_select())
            .first(&mut conn)
            .optional()?
            .ok_or(ApiError::NotFound("Usuario no encontrado"))
    })
    .await??;
    Ok(HttpResponse::Ok().json(usuario))
}

pub async fn create(
    pool: web::Data<DbPool>,
    body: web::Json<NewUsuario>,
) -> Result<HttpResponse, ApiError> {
    let datos = body.into_inner();
    let id = web::block(move || -> Result<i32, ApiError> {
        // Validation and hashing happen off the async executor.
        let row = datos.into_insert()?;
        let mut conn = pool.get()?;
        Ok(diesel::insert_into(usuarios::table)
            .values(&row)
            .returning(usuarios::id_usuario)
            .get_result(&mut conn)?)
    })
    .await??;
    Ok(HttpResponse::Created().json(json!({ "ID_USUARIO": id })))
}

pub async fn update(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<UsuarioUpdate>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let datos = body.into_inner();
    web::block(move || -> Result<(), ApiError> {
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            usuarios::table
                .find(id)
                .select(usuarios::id_usuario)
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound("Usuario no encontrado"))?;
            let cambios = datos.into_changeset()?;
            if cambios.is_empty() {
                return Err(ApiError::NothingToUpdate);
            }
            diesel::update(usuarios::table.find(id)).set(&cambios).execute(conn)?;
            Ok(())
        })
    })
    .await??;
    Ok(HttpResponse::Ok().body("Usuario actualizado exitosamente"))
}

pub async fn delete(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    web::block(move || -> Result<(), ApiError> {
        let mut conn = pool.get()?;
        conn.transaction(|conn| {
            usuarios::table
                .find(id)
                .select(usuarios::id_usuario)
                .first::<i32>(conn)
                .optional()?
                .ok_or(ApiError::NotFound("Usuario no encontrado"))?;
            match diesel::delete(usuarios::table.find(id)).execute(conn) {
                Ok(_) => Ok(()),
                Err(DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)) => {
                    Err(ApiError::DependencyConflict(
                        "No se puede eliminar el usuario porque tiene registros asociados.",
                    ))
                }
                Err(err) => Err(err.into()),
            }
        })
    })
    .await??;
    Ok(HttpResponse::Ok().body("Usuario eliminado exitosamente"))
}
