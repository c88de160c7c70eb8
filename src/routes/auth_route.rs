use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};

use crate::config::settings::Settings;
use crate::controllers::auth_controller::{
    login, me, register, request_password_reset, request_profile_update, reset_password,
    update_profile, verify_face,
};
use crate::middleware::auth::require_auth;

pub fn auth_router(settings: Arc<Settings>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/verifyface", post(verify_face))
        .route("/request-password-reset-face-verify", post(request_password_reset))
        .route("/reset-password-with-token", post(reset_password))
        .route(
            "/me",
            get(me).route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/verify-face-for-profile-update",
            post(request_profile_update)
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/update-profile",
            put(update_profile).route_layer(from_fn_with_state(settings, require_auth)),
        )
}
