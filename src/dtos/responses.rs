use std::collections::HashMap;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::election::{
    Application, ApplicationStatus, BallotEntry, Election, ElectionStatus, ElectionType,
    RatingScale, SocialMedia,
};
use crate::models::user::{Gender, Role, User};
use crate::models::vote::{Choice, Vote};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub status: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        ApiResponse {
            success: status.is_success(),
            status: status.as_u16() as i32,
            message: message.into(),
            data,
            timestamp: Utc::now(),
            error: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDTO {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub profile_image: String,
    pub id_number: String,
    pub cv_path: String,
    pub birth_date: DateTime<Utc>,
    pub gender: Gender,
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    pub phone_number: String,
    pub is_verified: bool,
    pub is_approved: bool,
    pub has_voted: HashMap<String, bool>,
    pub bookmarked_elections: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserDTO {
    fn from(user: &User) -> Self {
        UserDTO {
            id: user.id_hex(),
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            profile_image: user.profile_image.clone(),
            id_number: user.id_number.clone(),
            cv_path: user.cv_path.clone(),
            birth_date: user.birth_date,
            gender: user.gender,
            street: user.street.clone(),
            city: user.city.clone(),
            state: user.state.clone(),
            zip_code: user.zip_code.clone(),
            phone_number: user.phone_number.clone(),
            is_verified: user.is_verified,
            is_approved: user.is_approved,
            has_voted: user.has_voted.clone(),
            bookmarked_elections: user
                .bookmarked_elections
                .iter()
                .map(|id| id.to_hex())
                .collect(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageOneData {
    pub stage_one_token: String,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenData {
    pub token: String,
    pub user: UserDTO,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTokenData {
    pub reset_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTokenData {
    pub update_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotEntryDTO {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_label: Option<String>,
    pub name: String,
    pub profile_image: String,
    pub application_description: String,
    pub cv_path: String,
    pub id_number: String,
    pub plan_points: Vec<String>,
    pub social_media: SocialMedia,
}

impl From<&BallotEntry> for BallotEntryDTO {
    fn from(entry: &BallotEntry) -> Self {
        BallotEntryDTO {
            entry_id: entry.entry_id.map(|id| id.to_hex()),
            candidate_id: entry.candidate_id.map(|id| id.to_hex()),
            image_id: entry.image_id.map(|id| id.to_hex()),
            image_url: entry.image_url.clone(),
            image_label: entry.image_label.clone(),
            name: entry.name.clone(),
            profile_image: entry.profile_image.clone(),
            application_description: entry.application_description.clone(),
            cv_path: entry.cv_path.clone(),
            id_number: entry.id_number.clone(),
            plan_points: entry.plan_points.clone(),
            social_media: entry.social_media.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDTO {
    pub candidate_id: String,
    pub description: serde_json::Value,
    pub cv_path: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

impl From<&Application> for ApplicationDTO {
    fn from(app: &Application) -> Self {
        ApplicationDTO {
            candidate_id: app.candidate_id.to_hex(),
            description: app.description.clone(),
            cv_path: app.cv_path.clone(),
            status: app.status,
            applied_at: app.applied_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionDTO {
    pub id: String,
    pub title: String,
    pub description: String,
    pub election_type: ElectionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_options: Option<RatingScale>,
    pub thumbnail: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub candidates: Vec<BallotEntryDTO>,
    pub applications: Vec<ApplicationDTO>,
    pub status: ElectionStatus,
    pub created_by: String,
    /// Display name of the creating admin, attached by the controller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Election> for ElectionDTO {
    fn from(election: &Election) -> Self {
        ElectionDTO {
            id: election.id_hex(),
            title: election.title.clone(),
            description: election.description.clone(),
            election_type: election.election_type,
            proposition: election.proposition.clone(),
            rating_options: election.rating_options.clone(),
            thumbnail: election.thumbnail.clone(),
            start_date: election.start_date,
            end_date: election.end_date,
            candidates: election.candidates.iter().map(Into::into).collect(),
            applications: election.applications.iter().map(Into::into).collect(),
            status: election.status,
            created_by: election.created_by.to_hex(),
            created_by_name: None,
            created_at: election.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDTO {
    pub vote_id: String,
    pub election: String,
    pub voter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_value: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_image_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Vote> for VoteDTO {
    fn from(vote: &Vote) -> Self {
        VoteDTO {
            vote_id: vote.id.map(|id| id.to_hex()).unwrap_or_default(),
            election: vote.election.to_hex(),
            voter: vote.voter.to_hex(),
            candidate: vote.candidate.map(|id| id.to_hex()),
            choice: vote.choice,
            rating_value: vote.rating_value,
            selected_image_id: vote.selected_image_id.map(|id| id.to_hex()),
            created_at: vote.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionSummaryDTO {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ElectionStatus,
    pub election_type: ElectionType,
}

impl From<&Election> for ElectionSummaryDTO {
    fn from(election: &Election) -> Self {
        ElectionSummaryDTO {
            id: election.id_hex(),
            title: election.title.clone(),
            description: election.description.clone(),
            start_date: election.start_date,
            end_date: election.end_date,
            status: election.status,
            election_type: election.election_type,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyVoteDTO {
    pub vote_id: String,
    pub voted_at: DateTime<Utc>,
    pub election: ElectionSummaryDTO,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voted_for_candidate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice: Option<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating_value: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_image_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusDTO {
    pub election_id: String,
    pub election_title: String,
    pub election_status: ElectionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub application_status: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityData {
    pub can_vote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_vote_invalid: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatusData {
    pub has_voted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsDTO {
    pub total_elections: u64,
    pub pending_elections: u64,
    pub active_elections: u64,
    pub completed_elections: u64,
    pub total_pending_applications: u64,
    pub total_users: u64,
    pub total_voters: u64,
    pub total_candidates: u64,
    pub total_admins: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterStatsDTO {
    pub elections_voted_in: u64,
    pub active_elections_count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateStatsDTO {
    pub elections_applied_to: u64,
    pub elections_approved_for: u64,
    pub active_campaigns: u64,
    pub total_votes_received: u64,
}
