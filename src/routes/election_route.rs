use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::config::settings::Settings;
use crate::controllers::election_controller::{
    add_bookmark, apply_to_election, approve_application, create_election, delete_election,
    get_all_elections, get_applications, get_bookmarks, get_election_by_id, my_applications,
    reject_application, remove_bookmark, remove_candidate, update_election,
    update_election_status,
};
use crate::middleware::auth::{require_admin, require_auth, require_candidate};

pub fn election_router(settings: Arc<Settings>) -> Router {
    Router::new()
        // public
        .route("/", get(get_all_elections))
        // fixed segments before the id capture
        .route(
            "/my-applications",
            get(my_applications)
                .route_layer(from_fn(require_candidate))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/bookmarks",
            get(get_bookmarks).route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route("/{election_id}", get(get_election_by_id))
        // admin management
        .route(
            "/",
            post(create_election)
                .route_layer(from_fn(require_admin))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/{election_id}",
            put(update_election)
                .route_layer(from_fn(require_admin))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/{election_id}",
            delete(delete_election)
                .route_layer(from_fn(require_admin))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/{election_id}/status",
            patch(update_election_status)
                .route_layer(from_fn(require_admin))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        // applications
        .route(
            "/{election_id}/apply",
            post(apply_to_election)
                .route_layer(from_fn(require_candidate))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/{election_id}/applications",
            get(get_applications)
                .route_layer(from_fn(require_admin))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/{election_id}/applications/{candidate_id}/approve",
            put(approve_application)
                .route_layer(from_fn(require_admin))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/{election_id}/applications/{candidate_id}/reject",
            put(reject_application)
                .route_layer(from_fn(require_admin))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/{election_id}/candidates/{candidate_id}",
            delete(remove_candidate)
                .route_layer(from_fn(require_admin))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        // bookmarks
        .route(
            "/{election_id}/bookmark",
            post(add_bookmark).route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/{election_id}/bookmark",
            delete(remove_bookmark).route_layer(from_fn_with_state(settings, require_auth)),
        )
}
