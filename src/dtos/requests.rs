use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::election::{ElectionStatus, ElectionType};

#[derive(Deserialize, Clone)]
pub struct LoginDTO {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VerifyFaceDTO {
    pub stage_one_token: String,
    pub image: String,
    pub username: String,
}

#[derive(Deserialize, Clone)]
pub struct FaceImageDTO {
    pub image: String,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordDTO {
    pub reset_token: String,
    pub new_password: String,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileDTO {
    pub update_token: String,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteDTO {
    pub candidate_id: Option<String>,
    pub choice: Option<String>,
    pub rating_value: Option<i32>,
    pub selected_image_id: Option<String>,
}

#[derive(Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BallotOptionInputDTO {
    pub candidate_id: Option<String>,
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub application_description: Option<String>,
    pub cv_path: Option<String>,
    pub image_url: Option<String>,
    pub image_label: Option<String>,
}

#[derive(Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct RatingOptionsInputDTO {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RatingScaleInputDTO {
    #[serde(flatten)]
    pub range: RatingOptionsInputDTO,
    pub label_min: Option<String>,
    pub label_max: Option<String>,
}

// electionType and status arrive as free strings so that an unknown value is
// reported as a 400 validation failure rather than a body-rejection.
#[derive(Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateElectionDTO {
    pub title: String,
    pub description: String,
    pub election_type: String,
    pub proposition: Option<String>,
    pub rating_options: Option<RatingScaleInputDTO>,
    pub thumbnail: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub candidates: Vec<BallotOptionInputDTO>,
    pub status: Option<String>,
}

#[derive(Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateElectionDTO {
    pub title: Option<String>,
    pub description: Option<String>,
    pub election_type: Option<String>,
    pub proposition: Option<String>,
    pub rating_options: Option<RatingScaleInputDTO>,
    pub thumbnail: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub candidates: Option<Vec<BallotOptionInputDTO>>,
    pub status: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct UpdateStatusDTO {
    pub status: String,
}

#[derive(Deserialize, Clone)]
pub struct ResultQueryParams {
    pub live: Option<bool>,
}

#[derive(Deserialize, Clone)]
pub struct PendingQuery {
    pub pending: Option<String>,
}

/// Multipart registration payload, collected field by field in the
/// controller.
#[derive(Default, Clone)]
pub struct RegistrationForm {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub id_number: String,
    pub birth_date: String,
    pub gender: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: Option<String>,
    pub phone_number: String,
    pub profile_images: Vec<String>,
    pub cv_path: Option<String>,
}

pub fn parse_election_type(value: &str) -> Result<ElectionType, AppError> {
    match value {
        "candidate-based" => Ok(ElectionType::CandidateBased),
        "yes-no" => Ok(ElectionType::YesNo),
        "rating" => Ok(ElectionType::Rating),
        "image-based" => Ok(ElectionType::ImageBased),
        other => Err(AppError::Validation(format!(
            "A valid electionType (candidate-based, yes-no, rating, image-based) is required, got '{other}'"
        ))),
    }
}

pub fn parse_election_status(value: &str) -> Result<ElectionStatus, AppError> {
    match value {
        "pending" => Ok(ElectionStatus::Pending),
        "active" => Ok(ElectionStatus::Active),
        "completed" => Ok(ElectionStatus::Completed),
        "cancelled" => Ok(ElectionStatus::Cancelled),
        other => Err(AppError::Validation(format!(
            "Status must be one of: pending, active, completed, cancelled, got '{other}'"
        ))),
    }
}
