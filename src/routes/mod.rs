pub mod admin_route;
pub mod auth_route;
pub mod election_route;
pub mod stats_route;
pub mod vote_route;
