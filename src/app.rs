use std::sync::Arc;

use axum::{Extension, Router};
use mongodb::Database;
use tower_http::trace::TraceLayer;

use crate::config::cors::init_cors;
use crate::config::settings::Settings;
use crate::routes::{
    admin_route::admin_router, auth_route::auth_router, election_route::election_router,
    stats_route::stats_router, vote_route::vote_router,
};
use crate::services::face_client::FaceClient;

/// Assembles the full application router. Shared between `main` and the test
/// suite so both exercise the same middleware stack.
pub fn create_app(db: Arc<Database>, settings: Arc<Settings>) -> Router {
    let face = FaceClient::new(settings.face_api_url.clone());

    let api = Router::new()
        .nest("/auth", auth_router(settings.clone()))
        .nest("/elections", election_router(settings.clone()))
        .merge(vote_router(settings.clone()))
        .nest("/admin", admin_router(settings.clone()))
        .nest("/stats", stats_router(settings.clone()));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(db))
        .layer(Extension(settings.clone()))
        .layer(Extension(face))
        .layer(init_cors(&settings.cors_origin))
}
