use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::models::user::Role;

/// Marker distinguishing the intermediate password-check token from a full
/// session token. Stage-one tokens are only good for the face step.
pub const STAGE_ONE_TYPE: &str = "stageOneAuth";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(user_id: String, role: Role) -> Self {
        let now = Utc::now();
        SessionClaims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: (now + Duration::days(30)).timestamp(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StageOneClaims {
    pub sub: String,
    pub username: String,
    pub typ: String,
    pub iat: i64,
    pub exp: i64,
}

impl StageOneClaims {
    pub fn new(user_id: String, username: String) -> Self {
        let now = Utc::now();
        StageOneClaims {
            sub: user_id,
            username,
            typ: STAGE_ONE_TYPE.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(10)).timestamp(),
        }
    }
}

pub fn create_session_token(
    user_id: &str,
    role: Role,
    secret: &[u8],
) -> Result<String, AuthError> {
    let claims = SessionClaims::new(user_id.to_string(), role);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|_| AuthError::InvalidToken)
}

pub fn create_stage_one_token(
    user_id: &str,
    username: &str,
    secret: &[u8],
) -> Result<String, AuthError> {
    let claims = StageOneClaims::new(user_id.to_string(), username.to_string());
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|_| AuthError::InvalidToken)
}

pub fn verify_session_token(token: &str, secret: &[u8]) -> Result<SessionClaims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<SessionClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(map_jwt_error)?;
    Ok(token_data.claims)
}

pub fn verify_stage_one_token(token: &str, secret: &[u8]) -> Result<StageOneClaims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    let token_data =
        decode::<StageOneClaims>(token, &DecodingKey::from_secret(secret), &validation)
            .map_err(map_jwt_error)?;
    if token_data.claims.typ != STAGE_ONE_TYPE {
        return Err(AuthError::MalformedStageOneToken);
    }
    Ok(token_data.claims)
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn session_token_round_trip() {
        let token = create_session_token("abc123", Role::Voter, SECRET).unwrap();
        let claims = verify_session_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "abc123");
        assert_eq!(claims.role, Role::Voter);
    }

    #[test]
    fn stage_one_token_round_trip_keeps_username() {
        let token = create_stage_one_token("abc123", "alaa", SECRET).unwrap();
        let claims = verify_stage_one_token(&token, SECRET).unwrap();
        assert_eq!(claims.username, "alaa");
        assert_eq!(claims.typ, STAGE_ONE_TYPE);
    }

    #[test]
    fn session_token_is_not_a_stage_one_token() {
        let token = create_session_token("abc123", Role::Admin, SECRET).unwrap();
        assert!(verify_stage_one_token(&token, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_session_token("abc123", Role::Voter, SECRET).unwrap();
        assert!(verify_session_token(&token, b"other-secret").is_err());
    }
}
