use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};

use crate::config::settings::Settings;
use crate::controllers::vote_controller::{
    cast_vote, check_eligibility, get_election_votes, get_results, my_votes, vote_status,
};
use crate::middleware::auth::{require_admin, require_auth};

/// Vote routes nested under an election id, plus the voter-history route.
pub fn vote_router(settings: Arc<Settings>) -> Router {
    Router::new()
        .route(
            "/elections/{election_id}/votes",
            post(cast_vote).route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/elections/{election_id}/votes",
            get(get_election_votes)
                .route_layer(from_fn(require_admin))
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/elections/{election_id}/votes/status",
            get(vote_status).route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        .route(
            "/elections/{election_id}/votes/eligibility",
            get(check_eligibility)
                .route_layer(from_fn_with_state(settings.clone(), require_auth)),
        )
        // public, results stay readable without a token
        .route("/elections/{election_id}/votes/results", get(get_results))
        .route(
            "/votes/my-votes",
            get(my_votes).route_layer(from_fn_with_state(settings, require_auth)),
        )
}
