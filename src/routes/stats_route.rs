use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};

use crate::config::settings::Settings;
use crate::controllers::stats_controller::{admin_stats, candidate_stats, voter_stats};
use crate::middleware::auth::{require_admin, require_auth, require_candidate, require_voter};

pub fn stats_router(settings: Arc<Settings>) -> Router {
    Router::new()
        .route(
            "/admin",
            get(admin_stats)
                .route_layer(from_fn(require_admin))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/voter",
            get(voter_stats)
                .route_layer(from_fn(require_voter))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/candidate",
            get(candidate_stats)
                .route_layer(from_fn(require_candidate))
                .route_layer(from_fn_with_state(settings, require_auth)),
        )
}
