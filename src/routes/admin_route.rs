use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};

use crate::config::settings::Settings;
use crate::controllers::admin_controller::{
    approve_user, get_user_by_id, get_users, reject_user, run_status_update,
};
use crate::middleware::auth::{require_admin, require_auth};

pub fn admin_router(settings: Arc<Settings>) -> Router {
    Router::new()
        .route("/users", get(get_users))
        .route("/users/{user_id}", get(get_user_by_id))
        .route("/users/{user_id}/approve", put(approve_user))
        .route("/users/{user_id}/reject", delete(reject_user))
        .route("/update-election-statuses", post(run_status_update))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(settings, require_auth))
}
