use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
};
use mongodb::Database;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dtos::requests::PendingQuery;
use crate::dtos::responses::{ApiResponse, UserDTO};
use crate::error::{AppError, AuthError};
use crate::models::user::Role;
use crate::repositories::election_repository::ElectionRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::scheduler;

use super::parse_object_id;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepResultDTO {
    pub activated: u64,
    pub completed: u64,
}

//*GET:: api/v1/admin/users[?pending=true]
pub async fn get_users(
    Extension(db): Extension<Arc<Database>>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<ApiResponse<Vec<UserDTO>>>, AppError> {
    let user_repository = UserRepository::new(db);
    let users = if query.pending.as_deref() == Some("true") {
        user_repository.find_pending().await?
    } else {
        user_repository.find_all().await?
    };

    Ok(Json(ApiResponse::ok(
        "Users fetched successfully",
        users.iter().map(Into::into).collect(),
    )))
}

//*GET:: api/v1/admin/users/{user_id}
pub async fn get_user_by_id(
    Extension(db): Extension<Arc<Database>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserDTO>>, AppError> {
    let user_repository = UserRepository::new(db);
    let id = parse_object_id(&user_id, "user")?;
    let user = user_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;

    Ok(Json(ApiResponse::ok(
        "User fetched successfully",
        UserDTO::from(&user),
    )))
}

//?PUT:: api/v1/admin/users/{user_id}/approve
pub async fn approve_user(
    Extension(db): Extension<Arc<Database>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserDTO>>, AppError> {
    let user_repository = UserRepository::new(db);
    let id = parse_object_id(&user_id, "user")?;
    let mut user = user_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;

    user_repository.set_approved(&id).await?;
    user.is_approved = true;
    info!(username = %user.username, "Account approved");

    Ok(Json(ApiResponse::ok(
        "User approved successfully",
        UserDTO::from(&user),
    )))
}

//?DELETE:: api/v1/admin/users/{user_id}/reject
pub async fn reject_user(
    Extension(db): Extension<Arc<Database>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let user_repository = UserRepository::new(db);
    let id = parse_object_id(&user_id, "user")?;
    let user = user_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;

    if user.role == Role::Admin && user.is_approved {
        return Err(AuthError::Forbidden("Approved admin accounts cannot be rejected".into()).into());
    }

    user_repository.delete(&id).await?;
    info!(username = %user.username, "Account rejected and removed");

    Ok(Json(ApiResponse::with_status(
        StatusCode::OK,
        "User rejected and removed",
        None,
    )))
}

//?POST:: api/v1/admin/update-election-statuses
pub async fn run_status_update(
    Extension(db): Extension<Arc<Database>>,
) -> Result<Json<ApiResponse<SweepResultDTO>>, AppError> {
    let election_repository = ElectionRepository::new(db);
    let outcome = scheduler::run_status_sweep(&election_repository).await?;

    Ok(Json(ApiResponse::ok(
        "Election statuses updated",
        SweepResultDTO {
            activated: outcome.activated,
            completed: outcome.completed,
        },
    )))
}
