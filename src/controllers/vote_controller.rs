use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
    response::{sse::Event, IntoResponse, Response, Sse},
};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::Database;
use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::dtos::requests::{CastVoteDTO, ResultQueryParams};
use crate::dtos::responses::{
    ApiResponse, EligibilityData, MyVoteDTO, VoteDTO, VoteStatusData,
};
use crate::error::{vote_insert_error, AppError, ElectionError, VoteError};
use crate::middleware::auth::AuthUser;
use crate::models::election::{Election, ElectionStatus, ElectionType};
use crate::models::vote::{Choice, Vote};
use crate::repositories::election_repository::ElectionRepository;
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vote_repository::VoteRepository;
use crate::services::tally::{self, ResultsData};

use super::parse_object_id;

const LIVE_RESULTS_INTERVAL: Duration = Duration::from_secs(5);

//?POST:: api/v1/elections/{election_id}/votes
pub async fn cast_vote(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
    Path(election_id): Path<String>,
    Json(payload): Json<CastVoteDTO>,
) -> Result<(StatusCode, Json<ApiResponse<VoteDTO>>), AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let vote_repository = VoteRepository::new(db.clone());
    let user_repository = UserRepository::new(db);

    let id = parse_object_id(&election_id, "election")?;
    let election = election_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    if election.status != ElectionStatus::Active {
        return Err(ElectionError::NotActive(election.status.to_string()).into());
    }
    if !election.is_window_open(Utc::now()) {
        return Err(ElectionError::OutsideVotingWindow.into());
    }

    if let Some(existing) = vote_repository
        .find_by_election_and_voter(&id, &auth.id)
        .await?
    {
        if !is_stale_image_vote(&election, &existing) {
            return Err(VoteError::AlreadyVoted.into());
        }
        // The image option this ballot pointed at was removed; drop the stale
        // vote and let the voter choose again.
        if let Some(stale_id) = existing.id {
            vote_repository.delete(&stale_id).await?;
        }
        user_repository
            .unset_has_voted(&auth.id, &election.id_hex())
            .await?;
    }

    let mut vote = Vote::new(id, auth.id);
    fill_vote_payload(&mut vote, &election, &payload)?;

    vote.id = vote_repository
        .insert(&vote)
        .await
        .map_err(vote_insert_error)?;
    user_repository
        .set_has_voted(&auth.id, &election.id_hex())
        .await?;
    info!(election = %election.title, "Vote recorded");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            "Vote cast successfully",
            VoteDTO::from(&vote),
        )),
    ))
}

//*GET:: api/v1/elections/{election_id}/votes
pub async fn get_election_votes(
    Extension(db): Extension<Arc<Database>>,
    Path(election_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<VoteDTO>>>, AppError> {
    let vote_repository = VoteRepository::new(db);
    let id = parse_object_id(&election_id, "election")?;
    let votes = vote_repository.find_by_election(&id).await?;

    Ok(Json(ApiResponse::ok(
        "Votes fetched successfully",
        votes.iter().map(Into::into).collect(),
    )))
}

//*GET:: api/v1/elections/{election_id}/votes/status
pub async fn vote_status(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
    Path(election_id): Path<String>,
) -> Result<Json<ApiResponse<VoteStatusData>>, AppError> {
    let vote_repository = VoteRepository::new(db);
    let id = parse_object_id(&election_id, "election")?;
    let has_voted = vote_repository
        .find_by_election_and_voter(&id, &auth.id)
        .await?
        .is_some();

    Ok(Json(ApiResponse::ok(
        "Vote status fetched successfully",
        VoteStatusData { has_voted },
    )))
}

//*GET:: api/v1/elections/{election_id}/votes/eligibility
pub async fn check_eligibility(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
    Path(election_id): Path<String>,
) -> Result<Json<ApiResponse<EligibilityData>>, AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let vote_repository = VoteRepository::new(db);

    let id = parse_object_id(&election_id, "election")?;
    let election = election_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    let existing = vote_repository
        .find_by_election_and_voter(&id, &auth.id)
        .await?;
    let eligibility = compute_eligibility(&election, existing.as_ref(), Utc::now());

    Ok(Json(ApiResponse::ok(
        "Eligibility checked successfully",
        eligibility,
    )))
}

//*GET:: api/v1/elections/{election_id}/votes/results[?live=true]
pub async fn get_results(
    Extension(db): Extension<Arc<Database>>,
    Path(election_id): Path<String>,
    Query(filters): Query<ResultQueryParams>,
) -> Result<Response, AppError> {
    let election_repository = ElectionRepository::new(db.clone());
    let vote_repository = VoteRepository::new(db);

    let id = parse_object_id(&election_id, "election")?;
    // 404 before any stream is opened.
    election_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;

    if let Some(true) = filters.live {
        Ok(start_results_stream(election_repository, vote_repository, id).into_response())
    } else {
        let results = fetch_results(&election_repository, &vote_repository, &id).await?;
        Ok(Json(ApiResponse::ok(
            "Election results retrieved successfully",
            results,
        ))
        .into_response())
    }
}

//*GET:: api/v1/votes/my-votes
pub async fn my_votes(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<MyVoteDTO>>>, AppError> {
    let vote_repository = VoteRepository::new(db.clone());
    let election_repository = ElectionRepository::new(db);

    let votes = vote_repository.find_by_voter(&auth.id).await?;
    let election_ids: Vec<ObjectId> = votes.iter().map(|vote| vote.election).collect();
    let elections = election_repository.find_by_ids(&election_ids).await?;

    let history = votes
        .iter()
        .filter_map(|vote| {
            let election = elections
                .iter()
                .find(|e| e.id == Some(vote.election))?;
            Some(MyVoteDTO {
                vote_id: vote.id.map(|id| id.to_hex()).unwrap_or_default(),
                voted_at: vote.created_at,
                election: election.into(),
                voted_for_candidate: vote.candidate.map(|id| id.to_hex()),
                choice: vote.choice,
                rating_value: vote.rating_value,
                selected_image_id: vote.selected_image_id.map(|id| id.to_hex()),
            })
        })
        .collect();

    Ok(Json(ApiResponse::ok(
        "Voting history fetched successfully",
        history,
    )))
}

fn start_results_stream(
    elections: ElectionRepository,
    votes: VoteRepository,
    election_id: ObjectId,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(
        LIVE_RESULTS_INTERVAL,
    ))
    .then(move |_| {
        let elections = elections.clone();
        let votes = votes.clone();

        async move {
            let event = match fetch_results(&elections, &votes, &election_id).await {
                Ok(results) => {
                    let payload = serde_json::to_string(&results).unwrap_or_default();
                    Event::default().data(payload).event("results-update")
                }
                Err(_) => Event::default()
                    .data("Error fetching election results")
                    .event("error"),
            };
            Ok::<Event, Infallible>(event)
        }
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(LIVE_RESULTS_INTERVAL)
            .text("keep-alive"),
    )
}

async fn fetch_results(
    elections: &ElectionRepository,
    votes: &VoteRepository,
    election_id: &ObjectId,
) -> Result<ResultsData, AppError> {
    let election = elections
        .find_by_id(election_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Election".into()))?;
    let ballots = votes.find_by_election(election_id).await?;
    Ok(tally::aggregate(&election, &ballots))
}

/// True when an image-based ballot points at an option that has since been
/// removed from the election.
fn is_stale_image_vote(election: &Election, vote: &Vote) -> bool {
    if election.election_type != ElectionType::ImageBased {
        return false;
    }
    match vote.selected_image_id {
        Some(selected) => !election
            .candidates
            .iter()
            .any(|entry| entry.matches_image(&selected)),
        None => false,
    }
}

fn compute_eligibility(
    election: &Election,
    existing: Option<&Vote>,
    now: chrono::DateTime<Utc>,
) -> EligibilityData {
    if election.status != ElectionStatus::Active {
        return EligibilityData {
            can_vote: false,
            reason: Some(format!(
                "Election is not active (status: {})",
                election.status
            )),
            previous_vote_invalid: None,
        };
    }
    if !election.is_window_open(now) {
        return EligibilityData {
            can_vote: false,
            reason: Some("Voting period is not active".into()),
            previous_vote_invalid: None,
        };
    }
    match existing {
        Some(vote) if is_stale_image_vote(election, vote) => EligibilityData {
            can_vote: true,
            reason: Some("Your previously selected option was removed, you may vote again".into()),
            previous_vote_invalid: Some(true),
        },
        Some(_) => EligibilityData {
            can_vote: false,
            reason: Some("You have already voted in this election".into()),
            previous_vote_invalid: None,
        },
        None => EligibilityData {
            can_vote: true,
            reason: None,
            previous_vote_invalid: None,
        },
    }
}

/// Validates the cast payload against the election type and fills exactly one
/// of the vote's type-specific fields.
fn fill_vote_payload(
    vote: &mut Vote,
    election: &Election,
    payload: &CastVoteDTO,
) -> Result<(), AppError> {
    match election.election_type {
        ElectionType::CandidateBased => {
            let candidate_hex = payload
                .candidate_id
                .as_deref()
                .ok_or(VoteError::PayloadMismatch)?;
            let candidate = ObjectId::parse_str(candidate_hex)
                .map_err(|_| VoteError::InvalidCandidate)?;
            if !election.has_candidate(&candidate) {
                return Err(VoteError::InvalidCandidate.into());
            }
            vote.candidate = Some(candidate);
        }
        ElectionType::YesNo => {
            let choice = match payload.choice.as_deref() {
                Some("yes") => Choice::Yes,
                Some("no") => Choice::No,
                _ => return Err(VoteError::InvalidChoice.into()),
            };
            vote.choice = Some(choice);
        }
        ElectionType::Rating => {
            let scale = election.rating_options.clone().unwrap_or_default();
            let value = payload.rating_value.ok_or(VoteError::PayloadMismatch)?;
            if value < scale.range.min || value > scale.range.max {
                return Err(VoteError::RatingOutOfRange {
                    min: scale.range.min,
                    max: scale.range.max,
                }
                .into());
            }
            vote.rating_value = Some(value);
        }
        ElectionType::ImageBased => {
            let image_hex = payload
                .selected_image_id
                .as_deref()
                .ok_or(VoteError::PayloadMismatch)?;
            let selected = ObjectId::parse_str(image_hex)
                .map_err(|_| VoteError::InvalidImageOption)?;
            if !election
                .candidates
                .iter()
                .any(|entry| entry.matches_image(&selected))
            {
                return Err(VoteError::InvalidImageOption.into());
            }
            vote.selected_image_id = Some(selected);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::election::{BallotEntry, RatingOptions, RatingScale};
    use chrono::Duration;

    fn election(election_type: ElectionType) -> Election {
        let now = Utc::now();
        Election {
            id: Some(ObjectId::new()),
            title: "Test".into(),
            description: "Test".into(),
            election_type,
            proposition: Some("Adopt the proposal?".into()),
            rating_options: Some(RatingScale {
                range: RatingOptions { min: 1, max: 5 },
                label_min: "Poor".into(),
                label_max: "Excellent".into(),
            }),
            thumbnail: String::new(),
            start_date: now - Duration::hours(1),
            end_date: now + Duration::hours(1),
            candidates: Vec::new(),
            applications: Vec::new(),
            status: ElectionStatus::Active,
            manual_status: false,
            created_by: ObjectId::new(),
            created_at: now,
        }
    }

    fn payload() -> CastVoteDTO {
        CastVoteDTO {
            candidate_id: None,
            choice: None,
            rating_value: None,
            selected_image_id: None,
        }
    }

    #[test]
    fn candidate_vote_must_reference_a_ballot_entry() {
        let candidate = ObjectId::new();
        let mut election = election(ElectionType::CandidateBased);
        election.candidates.push(BallotEntry {
            entry_id: Some(ObjectId::new()),
            candidate_id: Some(candidate),
            ..Default::default()
        });

        let mut vote = Vote::new(election.id.unwrap(), ObjectId::new());
        let mut dto = payload();
        dto.candidate_id = Some(ObjectId::new().to_hex());
        assert!(fill_vote_payload(&mut vote, &election, &dto).is_err());

        dto.candidate_id = Some(candidate.to_hex());
        assert!(fill_vote_payload(&mut vote, &election, &dto).is_ok());
        assert_eq!(vote.candidate, Some(candidate));
    }

    #[test]
    fn yes_no_vote_rejects_other_strings() {
        let election = election(ElectionType::YesNo);
        let mut vote = Vote::new(election.id.unwrap(), ObjectId::new());

        let mut dto = payload();
        dto.choice = Some("maybe".into());
        assert!(fill_vote_payload(&mut vote, &election, &dto).is_err());

        dto.choice = Some("no".into());
        assert!(fill_vote_payload(&mut vote, &election, &dto).is_ok());
        assert_eq!(vote.choice, Some(Choice::No));
    }

    #[test]
    fn rating_vote_respects_the_scale() {
        let election = election(ElectionType::Rating);
        let mut vote = Vote::new(election.id.unwrap(), ObjectId::new());

        let mut dto = payload();
        dto.rating_value = Some(6);
        assert!(fill_vote_payload(&mut vote, &election, &dto).is_err());

        dto.rating_value = Some(5);
        assert!(fill_vote_payload(&mut vote, &election, &dto).is_ok());
    }

    #[test]
    fn missing_payload_is_a_mismatch() {
        let election = election(ElectionType::CandidateBased);
        let mut vote = Vote::new(election.id.unwrap(), ObjectId::new());
        assert!(matches!(
            fill_vote_payload(&mut vote, &election, &payload()),
            Err(AppError::Vote(VoteError::PayloadMismatch))
        ));
    }

    #[test]
    fn stale_image_vote_reopens_eligibility() {
        let keep = ObjectId::new();
        let removed = ObjectId::new();
        let mut election = election(ElectionType::ImageBased);
        election.candidates.push(BallotEntry {
            entry_id: Some(ObjectId::new()),
            image_id: Some(keep),
            image_url: Some("a.jpg".into()),
            ..Default::default()
        });

        let mut vote = Vote::new(election.id.unwrap(), ObjectId::new());
        vote.selected_image_id = Some(removed);
        assert!(is_stale_image_vote(&election, &vote));

        let eligibility = compute_eligibility(&election, Some(&vote), Utc::now());
        assert!(eligibility.can_vote);
        assert_eq!(eligibility.previous_vote_invalid, Some(true));

        vote.selected_image_id = Some(keep);
        assert!(!is_stale_image_vote(&election, &vote));
        let eligibility = compute_eligibility(&election, Some(&vote), Utc::now());
        assert!(!eligibility.can_vote);
    }

    #[test]
    fn eligibility_blocks_outside_the_window() {
        let mut e = election(ElectionType::YesNo);
        e.start_date = Utc::now() + Duration::hours(1);
        e.end_date = Utc::now() + Duration::hours(2);
        let eligibility = compute_eligibility(&e, None, Utc::now());
        assert!(!eligibility.can_vote);
        assert_eq!(
            eligibility.reason.as_deref(),
            Some("Voting period is not active")
        );
    }
}
