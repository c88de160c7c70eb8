use std::sync::Arc;

use axum::extract::{Extension, Json};
use mongodb::Database;

use crate::dtos::responses::{AdminStatsDTO, ApiResponse, CandidateStatsDTO, VoterStatsDTO};
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::election::ElectionStatus;
use crate::models::user::Role;
use crate::repositories::election_repository::ElectionRepository;
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vote_repository::VoteRepository;

//*GET:: api/v1/stats/admin
pub async fn admin_stats(
    Extension(db): Extension<Arc<Database>>,
) -> Result<Json<ApiResponse<AdminStatsDTO>>, AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let user_repository = UserRepository::new(db);

    let stats = AdminStatsDTO {
        total_elections: election_repository.count_all().await?,
        pending_elections: election_repository
            .count_by_status(ElectionStatus::Pending)
            .await?,
        active_elections: election_repository
            .count_by_status(ElectionStatus::Active)
            .await?,
        completed_elections: election_repository
            .count_by_status(ElectionStatus::Completed)
            .await?,
        total_pending_applications: election_repository.count_pending_applications().await?,
        total_users: user_repository.count_all().await?,
        total_voters: user_repository.count_by_role(Role::Voter).await?,
        total_candidates: user_repository.count_by_role(Role::Candidate).await?,
        total_admins: user_repository.count_by_role(Role::Admin).await?,
    };

    Ok(Json(ApiResponse::ok(
        "Admin dashboard stats fetched successfully",
        stats,
    )))
}

//*GET:: api/v1/stats/voter
pub async fn voter_stats(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<VoterStatsDTO>>, AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let user_repository = UserRepository::new(db);

    let user = user_repository
        .find_by_id(&auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;

    let stats = VoterStatsDTO {
        elections_voted_in: user.has_voted.values().filter(|&&voted| voted).count() as u64,
        active_elections_count: election_repository
            .count_by_status(ElectionStatus::Active)
            .await?,
    };

    Ok(Json(ApiResponse::ok(
        "Voter stats fetched successfully",
        stats,
    )))
}

//*GET:: api/v1/stats/candidate
pub async fn candidate_stats(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<CandidateStatsDTO>>, AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let vote_repository = VoteRepository::new(db);

    let pending_applications = election_repository.count_with_applicant(&auth.id).await?;
    let approved = election_repository.count_with_candidate(&auth.id).await?;

    let stats = CandidateStatsDTO {
        // Approved applications move onto the ballot, so both sets count as
        // applied.
        elections_applied_to: pending_applications + approved,
        elections_approved_for: approved,
        active_campaigns: election_repository
            .count_active_with_candidate(&auth.id)
            .await?,
        total_votes_received: vote_repository.count_for_candidate(&auth.id).await?,
    };

    Ok(Json(ApiResponse::ok(
        "Candidate stats fetched successfully",
        stats,
    )))
}
