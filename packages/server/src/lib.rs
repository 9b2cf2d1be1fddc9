#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the Fix-It map dashboards.
//!
//! Serves the REST API the dashboard frontends query for category
//! metadata, neighborhood selectors, and aggregated report clusters. The
//! CSV exports are loaded into memory exactly once before the HTTP server
//! starts; every handler reads the shared, immutable [`DataStore`], so
//! requests run concurrently without locking.

mod handlers;

use std::path::Path;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use chrono::NaiveDate;
use fixit_map_datastore::{DataStore, all_categories};

/// Shared application state.
pub struct AppState {
    /// The process-wide report datasets, loaded once at startup.
    pub store: Arc<DataStore>,
    /// The most recent `Created Date` across all datasets; anchor for
    /// relative date presets.
    pub last_date: NaiveDate,
}

/// Starts the Fix-It map API server.
///
/// Loads every configured category export from `data_dir`, then starts
/// the Actix-Web HTTP server. This is a regular async function — the
/// caller is responsible for providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if any dataset fails to load — a malformed export is a
/// deployment problem, not something to limp past.
#[allow(clippy::future_not_send)]
pub async fn run_server(data_dir: &Path) -> std::io::Result<()> {
    let specs = all_categories();

    log::info!("Loading datasets from {}...", data_dir.display());
    let store = DataStore::load(data_dir, &specs).expect("Failed to load report datasets");

    let last_date = store
        .last_date()
        .unwrap_or_else(|| chrono::Utc::now().date_naive());
    log::info!("Data ends on {last_date}");

    let state = web::Data::new(AppState {
        store: Arc::new(store),
        last_date,
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(handlers::health))
                    .route("/categories", web::get().to(handlers::categories))
                    .route("/neighborhoods", web::get().to(handlers::neighborhoods))
                    .route("/aggregate", web::get().to(handlers::aggregate_category))
                    .route("/aggregate/all", web::get().to(handlers::aggregate_all)),
            )
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
