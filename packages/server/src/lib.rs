#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for lead-forge.
//!
//! Serves the REST API for managing sales leads: session auth, lead CRUD,
//! filtered and paginated listings, and per-owner summary statistics.
//! All state lives in a `SQLite` database opened once at startup.

pub mod auth;
pub mod config;
pub mod error;
mod handlers;


use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use switchy_database::Database;

use crate::{config::ServerConfig, error::ApiError};

/// Shared application state.
pub struct AppState {
    /// Lead, user and session storage.
    pub db: Arc<dyn Database>,
    /// Settings the handlers need at request time.
    pub config: ServerConfig,
}

/// Registers the API routes and request body handling.
///
/// The app's default service should be [`route_not_found`] so unknown
/// paths get the JSON 404.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json = web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("Invalid request body: {err}")).into()
    });
    let query = web::QueryConfig::default().error_handler(|err, _req| {
        ApiError::BadRequest(format!("Invalid query string: {err}")).into()
    });

    cfg.app_data(json).app_data(query).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/logout", web::post().to(auth::logout))
                    .route("/me", web::get().to(auth::me)),
            )
            .service(
                web::scope("/leads")
                    .route("", web::get().to(handlers::list_leads))
                    .route("", web::post().to(handlers::create_lead))
                    // Must precede `/{id}`.
                    .route("/stats/summary", web::get().to(handlers::lead_stats))
                    .route("/{id}", web::get().to(handlers::get_lead))
                    .route("/{id}", web::put().to(handlers::update_lead))
                    .route("/{id}", web::delete().to(handlers::delete_lead)),
            ),
    );
}

pub use handlers::route_not_found;

/// Starts the lead-forge API server.
///
/// Reads [`ServerConfig`] from the environment, opens (and if needed
/// creates) the `SQLite` database, and starts the Actix-Web HTTP server.
/// The caller provides the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the database cannot be opened,
/// or the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();

    log::info!("Opening database at {}...", config.database_path.display());
    let db = lead_forge_database::db::open(&config.database_path)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let bind_addr = config.bind_addr.clone();
    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();

    let state = web::Data::new(AppState {
        db: Arc::from(db),
        config,
    });

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
            .default_service(web::to(route_not_found))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
