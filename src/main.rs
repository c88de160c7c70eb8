use std::sync::Arc;

use tracing::info;

mod app;
mod config;
mod controllers;
mod dtos;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod utils;

#[cfg(test)]
mod tests;

use config::{db::init_database, logger::initialize_logger, settings::Settings};
use repositories::election_repository::ElectionRepository;
use repositories::vote_repository::VoteRepository;
use services::scheduler::spawn_status_sweeper;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    initialize_logger();

    info!("🚀 Server starting initialization...");

    let settings = Arc::new(Settings::from_env().expect("Missing required environment variables"));
    let db = init_database(&settings)
        .await
        .expect("Failed to initialize database");

    VoteRepository::new(db.clone())
        .ensure_indexes()
        .await
        .expect("Failed to create vote indexes");

    let sweeper = if settings.auto_status_updates {
        info!("Automatic election status updates enabled");
        Some(spawn_status_sweeper(ElectionRepository::new(db.clone())))
    } else {
        info!("Automatic election status updates disabled");
        None
    };

    let app = app::create_app(db, settings.clone());

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .expect("Failed to bind server address");
    info!("🚀 Server started successfully at {}", settings.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!("Server stopped");
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
