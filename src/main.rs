use std::env;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use anyhow::Context;
use diesel::r2d2::{self, ConnectionManager};
use diesel::PgConnection;
use dotenvy::dotenv;
use tracing::info;

pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod patch;
pub mod refs;
pub mod schema;
pub mod validate;

// Database connection pool type
pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // create db connection pool
    let database_url = database_url_from_env()?;
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .build(manager)
        .context("failed to create database pool")?;

    let port = match env::var("PORT") {
        Ok(raw) => raw.parse::<u16>().context("PORT must be a valid port number")?,
        Err(_) => 3000,
    };
    info!("servidor escuchando en el puerto {port}");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .service(
                web::scope("/usuarios")
                    .route("", web::get().to(handlers::usuarios::list))
                    .route("", web::post().to(handlers::usuarios::create))
                    .route("/{id}", web::get().to(handlers::usuarios::get))
                    .route("/{id}", web::put().to(handlers::usuarios::update))
                    .route("/{id}", web::delete().to(handlers::usuarios::delete)),
            )
            .service(
                web::scope("/pacientes")
                    .route("", web::get().to(handlers::pacientes::list))
                    .route("", web::post().to(handlers::pacientes::create))
                    .route("/{id}", web::get().to(handlers::pacientes::get))
                    .route("/{id}", web::put().to(handlers::pacientes::update))
                    .route("/{id}", web::delete().to(handlers::pacientes::delete)),
            )
            .service(
                web::scope("/citas")
                    .route("", web::get().to(handlers::citas::list))
                    .route("", web::post().to(handlers::citas::create))
                    .route("/paciente/{id}", web::get().to(handlers::citas::by_paciente))
                    .route("/{id}", web::get().to(handlers::citas::get))
                    .route("/{id}", web::put().to(handlers::citas::update))
                    .route("/{id}", web::delete().to(handlers::citas::delete)),
            )
            .service(
                web::scope("/consultas")
                    .route("", web::get().to(handlers::consultas::list))
                    .route("", web::post().to(handlers::consultas::create))
                    .route("/paciente/{id}", web::get().to(handlers::consultas::by_paciente))
                    .route("/{id}", web::get().to(handlers::consultas::get))
                    .route("/{id}", web::put().to(handlers::consultas::update))
                    .route("/{id}", web::delete().to(handlers::consultas::delete)),
            )
            .service(
                web::scope("/recetas")
                    .route("", web::get().to(handlers::recetas::list))
                    .route("", web::post().to(handlers::recetas::create))
                    .route("/paciente/{id}", web::get().to(handlers::recetas::by_paciente))
                    .route("/consulta/{id}", web::get().to(handlers::recetas::by_consulta))
                    .route("/medico/{id}", web::get().to(handlers::recetas::by_medico))
                    .route("/{id}", web::get().to(handlers::recetas::get))
                    .route("/{id}", web::put().to(handlers::recetas::update))
                    .route("/{id}", web::delete().to(handlers::recetas::delete)),
            )
            .service(
                web::scope("/documentos")
                    .route("", web::get().to(handlers::documentos::list))
                    .route("", web::post().to(handlers::documentos::create))
                    .route("/{id}/descargar", web::get().to(handlers::documentos::descargar))
                    .route("/{id}", web::get().to(handlers::documentos::get))
                    .route("/{id}", web::put().to(handlers::documentos::update))
                    .route("/{id}", web::delete().to(handlers::documentos::delete)),
            )
            .route("/", web::get().to(index))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    Ok(())
}

async fn index() -> impl Responder {
    HttpResponse::Ok().body("Clinica API")
}

/// `DATABASE_URL` wins when set; otherwise the URL is composed from the
/// `DB_*` variables so deployments can pass host and credentials separately.
/// The store is reached over TLS unless `DB_SSLMODE` says otherwise.
fn database_url_from_env() -> anyhow::Result<String> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }
    let host = env::var("DB_HOST").context("DB_HOST must be set")?;
    let user = env::var("DB_USER").context("DB_USER must be set")?;
    let password = env::var("DB_PASSWORD").context("DB_PASSWORD must be set")?;
    let name = env::var("DB_NAME").context("DB_NAME must be set")?;
    let port = env::var("DB_PORT").unwrap_or_else(|_| "5432".into());
    let sslmode = env::var("DB_SSLMODE").unwrap_or_else(|_| "require".into());
    Ok(format!(
        "postgres://{user}:{password}@{host}:{port}/{name}?sslmode={sslmode}"
    ))
}
