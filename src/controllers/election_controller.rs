use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Multipart, Path},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::Database;
use tracing::info;

use crate::config::settings::Settings;
use crate::dtos::requests::{
    parse_election_status, parse_election_type, BallotOptionInputDTO, CreateElectionDTO,
    UpdateElectionDTO, UpdateStatusDTO,
};
use crate::dtos::responses::{
    ApiResponse, ApplicationDTO, ApplicationStatusDTO, ElectionDTO, ElectionSummaryDTO,
};
use crate::error::{AppError, ElectionError};
use crate::middleware::auth::AuthUser;
use crate::models::election::{
    Application, ApplicationStatus, BallotEntry, Election, ElectionStatus, ElectionType,
    RatingOptions, RatingScale, SocialMedia,
};
use crate::models::user::Role;
use crate::repositories::election_repository::ElectionRepository;
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vote_repository::VoteRepository;

use super::parse_object_id;

const MAX_TITLE_LEN: usize = 100;
const MAX_PROPOSITION_LEN: usize = 500;

//*GET:: api/v1/elections
pub async fn get_all_elections(
    Extension(db): Extension<Arc<Database>>,
) -> Result<Json<ApiResponse<Vec<ElectionDTO>>>, AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let user_repository = UserRepository::new(db);

    let elections = election_repository.find_all().await?;
    let dtos = attach_creators(&elections, &user_repository).await?;

    Ok(Json(ApiResponse::ok(
        "All elections fetched successfully",
        dtos,
    )))
}

//*GET:: api/v1/elections/{election_id}
pub async fn get_election_by_id(
    Extension(db): Extension<Arc<Database>>,
    Path(election_id): Path<String>,
) -> Result<Json<ApiResponse<ElectionDTO>>, AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let user_repository = UserRepository::new(db);

    let id = parse_object_id(&election_id, "election")?;
    let election = election_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    let dto = attach_creators(std::slice::from_ref(&election), &user_repository)
        .await?
        .pop()
        .ok_or(AppError::Internal)?;

    Ok(Json(ApiResponse::ok(
        "Election retrieved successfully",
        dto,
    )))
}

/// Resolves the creating admins' display names in one batched lookup.
async fn attach_creators(
    elections: &[Election],
    users: &UserRepository,
) -> Result<Vec<ElectionDTO>, AppError> {
    let mut creator_ids: Vec<ObjectId> = elections.iter().map(|e| e.created_by).collect();
    creator_ids.sort_unstable();
    creator_ids.dedup();
    let creators = users.find_by_ids(&creator_ids).await?;

    Ok(elections
        .iter()
        .map(|election| {
            let mut dto = ElectionDTO::from(election);
            dto.created_by_name = creators
                .iter()
                .find(|user| user.id == Some(election.created_by))
                .map(|user| user.name.clone());
            dto
        })
        .collect())
}

//?POST:: api/v1/elections
pub async fn create_election(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateElectionDTO>,
) -> Result<(StatusCode, Json<ApiResponse<ElectionDTO>>), AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let user_repository = UserRepository::new(db);

    validate_title(&payload.title)?;
    if payload.description.trim().is_empty() {
        return Err(AppError::Validation("Description is required".into()));
    }
    let election_type = parse_election_type(&payload.election_type)?;
    validate_dates(payload.start_date, payload.end_date)?;

    let requested_status = payload
        .status
        .as_deref()
        .map(parse_election_status)
        .transpose()?;

    let now = Utc::now();
    let mut election = Election {
        id: None,
        title: payload.title.trim().to_string(),
        description: payload.description.trim().to_string(),
        election_type,
        proposition: None,
        rating_options: None,
        thumbnail: payload
            .thumbnail
            .clone()
            .unwrap_or_else(|| "no-thumbnail.jpg".into()),
        start_date: payload.start_date,
        end_date: payload.end_date,
        candidates: Vec::new(),
        applications: Vec::new(),
        status: Election::initial_status(election_type, requested_status, now, payload.end_date),
        manual_status: requested_status.is_some(),
        created_by: auth.id,
        created_at: now,
    };

    apply_type_payload(
        &mut election,
        election_type,
        payload.proposition.clone(),
        payload.rating_options.as_ref().map(build_rating_scale).transpose()?,
        &payload.candidates,
        &user_repository,
    )
    .await?;

    let id = election_repository.insert(&election).await?;
    election.id = Some(id);
    info!(title = %election.title, election_type = %election_type, "Election created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            "Election created successfully",
            ElectionDTO::from(&election),
        )),
    ))
}

//?PUT:: api/v1/elections/{election_id}
pub async fn update_election(
    Extension(db): Extension<Arc<Database>>,
    Path(election_id): Path<String>,
    Json(payload): Json<UpdateElectionDTO>,
) -> Result<Json<ApiResponse<ElectionDTO>>, AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let user_repository = UserRepository::new(db);

    let id = parse_object_id(&election_id, "election")?;
    let mut election = election_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    if let Some(title) = payload.title.as_deref() {
        validate_title(title)?;
        election.title = title.trim().to_string();
    }
    if let Some(description) = payload.description.as_deref() {
        if description.trim().is_empty() {
            return Err(AppError::Validation("Description is required".into()));
        }
        election.description = description.trim().to_string();
    }
    if let Some(thumbnail) = payload.thumbnail.clone() {
        election.thumbnail = thumbnail;
    }
    if let Some(start) = payload.start_date {
        election.start_date = start;
    }
    if let Some(end) = payload.end_date {
        election.end_date = end;
    }
    validate_dates(election.start_date, election.end_date)?;

    // A type change resets every type-specific field before the new payload
    // is applied.
    let new_type = payload
        .election_type
        .as_deref()
        .map(parse_election_type)
        .transpose()?;
    let type_changed = new_type.is_some_and(|t| t != election.election_type);
    if type_changed {
        election.proposition = None;
        election.rating_options = None;
        election.candidates.clear();
        election.applications.clear();
    }
    if let Some(t) = new_type {
        election.election_type = t;
    }

    let wants_payload = type_changed
        || payload.proposition.is_some()
        || payload.rating_options.is_some()
        || payload.candidates.is_some();
    if wants_payload {
        let proposition = payload
            .proposition
            .clone()
            .or_else(|| election.proposition.clone());
        let rating = match payload.rating_options.as_ref() {
            Some(input) => Some(build_rating_scale(input)?),
            None => election.rating_options.clone(),
        };
        let ballot_inputs = payload.candidates.clone().unwrap_or_default();
        let current_type = election.election_type;

        apply_type_payload(
            &mut election,
            current_type,
            proposition,
            rating,
            &ballot_inputs,
            &user_repository,
        )
        .await?;
    }

    if let Some(status) = payload.status.as_deref() {
        election.status = parse_election_status(status)?;
        election.manual_status = true;
    }

    election_repository.replace(&id, &election).await?;
    Ok(Json(ApiResponse::ok(
        "Election updated successfully",
        ElectionDTO::from(&election),
    )))
}

/// Deletes the election together with its votes and the voters' hasVoted
/// entries.
pub async fn delete_election(
    Extension(db): Extension<Arc<Database>>,
    Path(election_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let vote_repository = VoteRepository::new(db.clone());
    let user_repository = UserRepository::new(db);

    let id = parse_object_id(&election_id, "election")?;
    let election = election_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    let votes = vote_repository.find_by_election(&id).await?;
    let voters: Vec<ObjectId> = votes.iter().map(|vote| vote.voter).collect();
    vote_repository.delete_by_election(&id).await?;
    user_repository
        .unset_has_voted_many(&voters, &election.id_hex())
        .await?;
    election_repository.delete(&id).await?;
    info!(title = %election.title, "Election deleted");

    Ok(Json(ApiResponse::with_status(
        StatusCode::OK,
        "Election and its votes deleted successfully",
        None,
    )))
}

//?PATCH:: api/v1/elections/{election_id}/status
pub async fn update_election_status(
    Extension(db): Extension<Arc<Database>>,
    Path(election_id): Path<String>,
    Json(payload): Json<UpdateStatusDTO>,
) -> Result<Json<ApiResponse<ElectionDTO>>, AppError> {
    let election_repository = ElectionRepository::new(db);
    let id = parse_object_id(&election_id, "election")?;
    let status = parse_election_status(&payload.status)?;

    let updated = election_repository
        .set_status(&id, status, true)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    Ok(Json(ApiResponse::ok(
        "Election status updated successfully",
        ElectionDTO::from(&updated),
    )))
}

//?POST:: api/v1/elections/{election_id}/apply
pub async fn apply_to_election(
    Extension(db): Extension<Arc<Database>>,
    Extension(settings): Extension<Arc<Settings>>,
    Extension(auth): Extension<AuthUser>,
    Path(election_id): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ApplicationDTO>>), AppError> {
    let election_repository = ElectionRepository::new(db);
    let id = parse_object_id(&election_id, "election")?;
    let mut election = election_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    if election.election_type != ElectionType::CandidateBased {
        return Err(ElectionError::NotCandidateBased.into());
    }
    if election.status != ElectionStatus::Pending {
        return Err(ElectionError::NotPending.into());
    }
    if election.application_of(&auth.id).is_some() {
        return Err(ElectionError::AlreadyApplied.into());
    }
    if election.has_candidate(&auth.id) {
        return Err(ElectionError::AlreadyCandidate.into());
    }

    let mut description_raw = String::new();
    let mut cv_path = String::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("Malformed multipart body: {err}")))?
    {
        match field.name().unwrap_or_default() {
            "description" => description_raw = field.text().await.unwrap_or_default(),
            "cv" => {
                let file_name = field.file_name().unwrap_or("cv.pdf").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::Validation(format!("Unreadable CV: {err}")))?;
                cv_path =
                    super::auth_controller::store_upload(&settings, &file_name, &bytes).await?;
            }
            _ => {}
        }
    }
    if description_raw.trim().is_empty() {
        return Err(AppError::Validation(
            "An application description is required".into(),
        ));
    }

    // Structured payloads arrive as JSON, plain summaries as text.
    let description = serde_json::from_str::<serde_json::Value>(&description_raw)
        .unwrap_or_else(|_| serde_json::Value::String(description_raw.clone()));

    let application = Application {
        candidate_id: auth.id,
        description,
        cv_path,
        status: ApplicationStatus::Pending,
        applied_at: Utc::now(),
    };
    election.applications.push(application.clone());
    election_repository.replace(&id, &election).await?;
    info!(election = %election.title, "New candidate application");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            "Application submitted successfully",
            ApplicationDTO::from(&application),
        )),
    ))
}

//*GET:: api/v1/elections/{election_id}/applications
pub async fn get_applications(
    Extension(db): Extension<Arc<Database>>,
    Path(election_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ApplicationDTO>>>, AppError> {
    let election_repository = ElectionRepository::new(db);
    let id = parse_object_id(&election_id, "election")?;
    let election = election_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    Ok(Json(ApiResponse::ok(
        "Applications fetched successfully",
        election.applications.iter().map(Into::into).collect(),
    )))
}

//?PUT:: api/v1/elections/{election_id}/applications/{candidate_id}/approve
pub async fn approve_application(
    Extension(db): Extension<Arc<Database>>,
    Path((election_id, candidate_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ElectionDTO>>, AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let user_repository = UserRepository::new(db);

    let id = parse_object_id(&election_id, "election")?;
    let candidate = parse_object_id(&candidate_id, "candidate")?;
    let mut election = election_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    if election.election_type != ElectionType::CandidateBased {
        return Err(ElectionError::NotCandidateBased.into());
    }
    if election.status != ElectionStatus::Pending {
        return Err(ElectionError::NotPending.into());
    }
    if election.has_candidate(&candidate) {
        return Err(ElectionError::AlreadyCandidate.into());
    }
    let index = election
        .application_of(&candidate)
        .ok_or(ElectionError::ApplicationNotFound)?;

    let application = election.applications.remove(index);
    let user = user_repository
        .find_by_id(&candidate)
        .await?
        .ok_or_else(|| AppError::NotFound("Candidate".into()))?;

    election
        .candidates
        .push(ballot_entry_from_application(&application, &user));
    election_repository.replace(&id, &election).await?;
    info!(election = %election.title, candidate = %user.username, "Application approved");

    Ok(Json(ApiResponse::ok(
        "Application approved, candidate added to the ballot",
        ElectionDTO::from(&election),
    )))
}

//?PUT:: api/v1/elections/{election_id}/applications/{candidate_id}/reject
pub async fn reject_application(
    Extension(db): Extension<Arc<Database>>,
    Path((election_id, candidate_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ElectionDTO>>, AppError> {
    let election_repository = ElectionRepository::new(db);
    let id = parse_object_id(&election_id, "election")?;
    let candidate = parse_object_id(&candidate_id, "candidate")?;
    let mut election = election_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    let index = election
        .application_of(&candidate)
        .ok_or(ElectionError::ApplicationNotFound)?;
    election.applications.remove(index);
    election_repository.replace(&id, &election).await?;

    Ok(Json(ApiResponse::ok(
        "Application rejected",
        ElectionDTO::from(&election),
    )))
}

//*GET:: api/v1/elections/my-applications
pub async fn my_applications(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<ApplicationStatusDTO>>>, AppError> {
    let election_repository = ElectionRepository::new(db);
    let elections = election_repository.find_involving_candidate(&auth.id).await?;

    let statuses = elections
        .iter()
        .map(|election| {
            let application_status = if election.has_candidate(&auth.id) {
                "Approved".to_string()
            } else {
                "Pending".to_string()
            };
            ApplicationStatusDTO {
                election_id: election.id_hex(),
                election_title: election.title.clone(),
                election_status: election.status,
                start_date: election.start_date,
                end_date: election.end_date,
                application_status,
            }
        })
        .collect();

    Ok(Json(ApiResponse::ok(
        "Application statuses fetched successfully",
        statuses,
    )))
}

/// Removes a candidate and invalidates any ballots cast for them so the
/// affected voters can vote again.
pub async fn remove_candidate(
    Extension(db): Extension<Arc<Database>>,
    Path((election_id, candidate_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ElectionDTO>>, AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let vote_repository = VoteRepository::new(db.clone());
    let user_repository = UserRepository::new(db);

    let id = parse_object_id(&election_id, "election")?;
    let candidate = parse_object_id(&candidate_id, "candidate")?;
    let mut election = election_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    if election.status == ElectionStatus::Completed {
        return Err(ElectionError::Completed.into());
    }
    let before = election.candidates.len();
    election
        .candidates
        .retain(|entry| entry.candidate_id.as_ref() != Some(&candidate));
    if election.candidates.len() == before {
        return Err(ElectionError::CandidateNotFound.into());
    }

    let votes = vote_repository.find_by_election(&id).await?;
    let affected: Vec<ObjectId> = votes
        .iter()
        .filter(|vote| vote.candidate.as_ref() == Some(&candidate))
        .map(|vote| vote.voter)
        .collect();
    vote_repository.delete_for_candidate(&id, &candidate).await?;
    user_repository
        .unset_has_voted_many(&affected, &election.id_hex())
        .await?;

    election_repository.replace(&id, &election).await?;
    info!(election = %election.title, invalidated = affected.len(), "Candidate removed");

    Ok(Json(ApiResponse::ok(
        "Candidate removed from the election",
        ElectionDTO::from(&election),
    )))
}

//*GET:: api/v1/elections/bookmarks
pub async fn get_bookmarks(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<ElectionSummaryDTO>>>, AppError> {
    let user_repository = UserRepository::new(db.clone());
    let election_repository = ElectionRepository::new(db);

    let user = user_repository
        .find_by_id(&auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;
    let elections = election_repository
        .find_by_ids(&user.bookmarked_elections)
        .await?;

    Ok(Json(ApiResponse::ok(
        "Bookmarked elections fetched successfully",
        elections.iter().map(Into::into).collect(),
    )))
}

//?POST:: api/v1/elections/{election_id}/bookmark
pub async fn add_bookmark(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
    Path(election_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let user_repository = UserRepository::new(db.clone());
    let election_repository = ElectionRepository::new(db);

    let id = parse_object_id(&election_id, "election")?;
    election_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    let user = user_repository
        .find_by_id(&auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;
    if user.bookmarked_elections.contains(&id) {
        return Err(ElectionError::AlreadyBookmarked.into());
    }

    user_repository.push_bookmark(&auth.id, &id).await?;
    Ok(Json(ApiResponse::with_status(
        StatusCode::OK,
        "Election bookmarked",
        None,
    )))
}

//?DELETE:: api/v1/elections/{election_id}/bookmark
pub async fn remove_bookmark(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
    Path(election_id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let user_repository = UserRepository::new(db);
    let id = parse_object_id(&election_id, "election")?;

    let user = user_repository
        .find_by_id(&auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;
    if !user.bookmarked_elections.contains(&id) {
        return Err(ElectionError::NotBookmarked.into());
    }

    user_repository.pull_bookmark(&auth.id, &id).await?;
    Ok(Json(ApiResponse::with_status(
        StatusCode::OK,
        "Bookmark removed",
        None,
    )))
}

fn validate_title(title: &str) -> Result<(), AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "Title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_dates(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), AppError> {
    if start >= end {
        return Err(ElectionError::InvalidDates(
            "start date must be before end date".into(),
        )
        .into());
    }
    Ok(())
}

fn build_rating_scale(
    input: &crate::dtos::requests::RatingScaleInputDTO,
) -> Result<RatingScale, AppError> {
    let defaults = RatingOptions::default();
    let min = input.range.min.unwrap_or(defaults.min);
    let max = input.range.max.unwrap_or(defaults.max);
    if min >= max {
        return Err(AppError::Validation(
            "Rating minimum must be below the maximum".into(),
        ));
    }
    Ok(RatingScale {
        range: RatingOptions { min, max },
        label_min: input.label_min.clone().unwrap_or_else(|| "Poor".into()),
        label_max: input
            .label_max
            .clone()
            .unwrap_or_else(|| "Excellent".into()),
    })
}

/// Applies the type-specific half of a create/update payload, validating it
/// against the election type.
async fn apply_type_payload(
    election: &mut Election,
    election_type: ElectionType,
    proposition: Option<String>,
    rating: Option<RatingScale>,
    ballot_inputs: &[BallotOptionInputDTO],
    users: &UserRepository,
) -> Result<(), AppError> {
    match election_type {
        ElectionType::YesNo => {
            let proposition = proposition
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| {
                    AppError::Validation("A proposition is required for yes-no elections".into())
                })?;
            if proposition.chars().count() > MAX_PROPOSITION_LEN {
                return Err(AppError::Validation(format!(
                    "Proposition cannot exceed {MAX_PROPOSITION_LEN} characters"
                )));
            }
            election.proposition = Some(proposition.to_string());
        }
        ElectionType::Rating => {
            election.rating_options = Some(rating.unwrap_or_default());
        }
        ElectionType::CandidateBased => {
            let mut entries = Vec::with_capacity(ballot_inputs.len());
            for input in ballot_inputs {
                let candidate_hex = input.candidate_id.as_deref().ok_or_else(|| {
                    AppError::Validation("Each ballot entry needs a candidateId".into())
                })?;
                let candidate_id = parse_object_id(candidate_hex, "candidate")?;
                let user = users
                    .find_by_id(&candidate_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Candidate".into()))?;
                if user.role != Role::Candidate {
                    return Err(AppError::Validation(format!(
                        "User '{}' does not have the candidate role",
                        user.username
                    )));
                }
                entries.push(BallotEntry {
                    entry_id: Some(ObjectId::new()),
                    candidate_id: Some(candidate_id),
                    name: user.name.clone(),
                    profile_image: user.profile_image.clone(),
                    application_description: input
                        .application_description
                        .clone()
                        .unwrap_or_default(),
                    cv_path: user.cv_path.clone(),
                    id_number: user.id_number.clone(),
                    ..Default::default()
                });
            }
            // An update without a candidates array keeps the current ballot.
            if !entries.is_empty() {
                election.candidates = entries;
            }
        }
        ElectionType::ImageBased => {
            if ballot_inputs.is_empty() && election.candidates.is_empty() {
                return Err(AppError::Validation(
                    "Image-based elections need at least one image option".into(),
                ));
            }
            if !ballot_inputs.is_empty() {
                let mut entries = Vec::with_capacity(ballot_inputs.len());
                for (position, input) in ballot_inputs.iter().enumerate() {
                    let image_url = input.image_url.as_deref().filter(|u| !u.is_empty()).ok_or_else(
                        || AppError::Validation("Each image option needs an imageUrl".into()),
                    )?;
                    let label = input
                        .image_label
                        .clone()
                        .or_else(|| input.name.clone())
                        .unwrap_or_else(|| format!("Option {}", position + 1));
                    entries.push(BallotEntry {
                        entry_id: Some(ObjectId::new()),
                        image_id: Some(ObjectId::new()),
                        image_url: Some(image_url.to_string()),
                        image_label: Some(label.clone()),
                        name: label,
                        ..Default::default()
                    });
                }
                election.candidates = entries;
            }
        }
    }
    Ok(())
}

/// Copies an approved application onto the ballot, pulling durable identity
/// fields from the user document and presentation fields from the
/// application payload.
fn ballot_entry_from_application(
    application: &Application,
    user: &crate::models::user::User,
) -> BallotEntry {
    let payload = application.description.as_object();
    let summary = payload
        .and_then(|obj| obj.get("summary"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            application
                .description
                .as_str()
                .unwrap_or_default()
                .to_string()
        });
    let name = payload
        .and_then(|obj| obj.get("fullName"))
        .and_then(|v| v.as_str())
        .unwrap_or(&user.name)
        .to_string();
    let plan_points = payload
        .and_then(|obj| obj.get("planPoints"))
        .and_then(|v| v.as_array())
        .map(|points| {
            points
                .iter()
                .filter_map(|p| p.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let social_media = payload
        .and_then(|obj| obj.get("socialMedia"))
        .and_then(|v| serde_json::from_value::<SocialMedia>(v.clone()).ok())
        .unwrap_or_default();

    BallotEntry {
        entry_id: Some(ObjectId::new()),
        candidate_id: Some(application.candidate_id),
        name,
        profile_image: user.profile_image.clone(),
        application_description: summary,
        cv_path: application.cv_path.clone(),
        id_number: user.id_number.clone(),
        plan_points,
        social_media,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_user() -> crate::models::user::User {
        crate::models::user::User {
            id: Some(ObjectId::new()),
            name: "Nour Hassan".into(),
            username: "nour".into(),
            email: "nour@example.com".into(),
            password: "hash".into(),
            role: Role::Candidate,
            profile_image: "uploads/nour.jpg".into(),
            id_number: "12345678901234".into(),
            cv_path: "uploads/nour-cv.pdf".into(),
            birth_date: Utc::now(),
            gender: crate::models::user::Gender::Female,
            street: "Main".into(),
            city: "Cairo".into(),
            state: "Cairo".into(),
            zip_code: None,
            phone_number: "01001234567".into(),
            is_verified: true,
            is_approved: true,
            has_voted: Default::default(),
            bookmarked_elections: Vec::new(),
            reset_password_token: None,
            reset_password_expire: None,
            profile_update_token: None,
            profile_update_expire: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn structured_application_payload_fills_the_ballot_entry() {
        let user = sample_user();
        let application = Application {
            candidate_id: user.id.unwrap(),
            description: json!({
                "fullName": "Nour H.",
                "summary": "Transparency first",
                "planPoints": ["Open budgets", "Weekly reports"],
                "socialMedia": { "twitter": "https://x.com/nour" }
            }),
            cv_path: "uploads/app-cv.pdf".into(),
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
        };

        let entry = ballot_entry_from_application(&application, &user);
        assert_eq!(entry.name, "Nour H.");
        assert_eq!(entry.application_description, "Transparency first");
        assert_eq!(entry.plan_points.len(), 2);
        assert_eq!(
            entry.social_media.twitter.as_deref(),
            Some("https://x.com/nour")
        );
        assert_eq!(entry.cv_path, "uploads/app-cv.pdf");
    }

    #[test]
    fn plain_string_payload_becomes_the_description() {
        let user = sample_user();
        let application = Application {
            candidate_id: user.id.unwrap(),
            description: json!("Just a summary"),
            cv_path: String::new(),
            status: ApplicationStatus::Pending,
            applied_at: Utc::now(),
        };

        let entry = ballot_entry_from_application(&application, &user);
        assert_eq!(entry.name, "Nour Hassan");
        assert_eq!(entry.application_description, "Just a summary");
        assert!(entry.plan_points.is_empty());
    }

    #[test]
    fn title_and_dates_are_validated() {
        assert!(validate_title("  ").is_err());
        assert!(validate_title(&"x".repeat(101)).is_err());
        assert!(validate_title("Council 2026").is_ok());

        let now = Utc::now();
        assert!(validate_dates(now, now).is_err());
        assert!(validate_dates(now, now + chrono::Duration::days(1)).is_ok());
    }

    #[test]
    fn rating_scale_rejects_inverted_ranges() {
        let input = crate::dtos::requests::RatingScaleInputDTO {
            range: crate::dtos::requests::RatingOptionsInputDTO {
                min: Some(5),
                max: Some(1),
            },
            label_min: None,
            label_max: None,
        };
        assert!(build_rating_scale(&input).is_err());

        let defaulted = crate::dtos::requests::RatingScaleInputDTO {
            range: Default::default(),
            label_min: Some("Bad".into()),
            label_max: None,
        };
        let scale = build_rating_scale(&defaulted).unwrap();
        assert_eq!(scale.range, RatingOptions { min: 1, max: 5 });
        assert_eq!(scale.label_min, "Bad");
        assert_eq!(scale.label_max, "Excellent");
    }
}
