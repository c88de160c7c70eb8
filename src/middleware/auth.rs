use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use mongodb::bson::oid::ObjectId;

use crate::config::settings::Settings;
use crate::error::{AppError, AuthError};
use crate::models::user::Role;
use crate::utils::jwt;

/// Identity attached to the request once the bearer token checks out.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
    pub role: Role,
}

pub async fn require_auth(
    State(settings): State<Arc<Settings>>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::MissingToken)?;
    let claims = jwt::verify_session_token(bearer.token(), settings.jwt_secret.as_bytes())?;
    let id = ObjectId::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;
    req.extensions_mut().insert(AuthUser {
        id,
        role: claims.role,
    });
    Ok(next.run(req).await)
}

fn require_role(req: &Request, wanted: Role, message: &str) -> Result<(), AppError> {
    let user = req
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingToken)?;
    if user.role == wanted {
        Ok(())
    } else {
        Err(AuthError::Forbidden(message.to_string()).into())
    }
}

pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(&req, Role::Admin, "Admin access required")?;
    Ok(next.run(req).await)
}

pub async fn require_candidate(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(&req, Role::Candidate, "Only candidates can perform this action")?;
    Ok(next.run(req).await)
}

pub async fn require_voter(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(&req, Role::Voter, "Only voters can perform this action")?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn role_guard_rejects_requests_without_an_identity() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert!(require_role(&req, Role::Admin, "Admin access required").is_err());
    }

    #[test]
    fn role_guard_matches_the_attached_role() {
        let mut req = Request::builder().body(Body::empty()).unwrap();
        req.extensions_mut().insert(AuthUser {
            id: ObjectId::new(),
            role: Role::Voter,
        });
        assert!(require_role(&req, Role::Voter, "voters only").is_ok());
        assert!(require_role(&req, Role::Admin, "admins only").is_err());
    }
}
