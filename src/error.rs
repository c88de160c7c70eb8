use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed: {0}")]
    Validation(String),

    // Authentication & token errors
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    // Election lifecycle errors
    #[error("Election error: {0}")]
    Election(#[from] ElectionError),

    // Vote casting / results errors
    #[error("Vote error: {0}")]
    Vote(#[from] VoteError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("File storage error: {0}")]
    Storage(String),

    // Upstream face recognition collaborator
    #[error("Face recognition service error: {0}")]
    FaceService(String),

    #[error("Internal server error")]
    Internal,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Malformed stage one token")]
    MalformedStageOneToken,
    #[error("User identity mismatch")]
    IdentityMismatch,
    #[error("Face verification failed")]
    FaceNotRecognized,
    #[error("Account not approved, awaiting admin approval")]
    AccountNotApproved,
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Email already exists")]
    EmailTaken,
    #[error("Invalid or expired reset token")]
    InvalidResetToken,
    #[error("Invalid or expired update token")]
    InvalidUpdateToken,
    #[error("{0}")]
    Forbidden(String),
}

#[derive(Error, Debug)]
pub enum ElectionError {
    #[error("Election is not currently active (status: {0})")]
    NotActive(String),
    #[error("Voting period is not active")]
    OutsideVotingWindow,
    #[error("Invalid election type")]
    InvalidType,
    #[error("Invalid election dates: {0}")]
    InvalidDates(String),
    #[error("You have already applied to this election")]
    AlreadyApplied,
    #[error("Application from this candidate was not found")]
    ApplicationNotFound,
    #[error("Applications are only handled for candidate-based elections")]
    NotCandidateBased,
    #[error("Applications can only be approved while the election is pending")]
    NotPending,
    #[error("Candidate is already approved for this election")]
    AlreadyCandidate,
    #[error("Candidate is not part of this election")]
    CandidateNotFound,
    #[error("Cannot remove candidates from completed elections")]
    Completed,
    #[error("Election already bookmarked")]
    AlreadyBookmarked,
    #[error("Election not bookmarked")]
    NotBookmarked,
}

#[derive(Error, Debug)]
pub enum VoteError {
    #[error("You have already voted in this election")]
    AlreadyVoted,
    #[error("Selected candidate is not participating in this election")]
    InvalidCandidate,
    #[error("A valid choice (yes/no) is required for this election")]
    InvalidChoice,
    #[error("Rating value must be between {min} and {max}")]
    RatingOutOfRange { min: i32, max: i32 },
    #[error("Selected image is not a valid option for this election")]
    InvalidImageOption,
    #[error("Vote payload does not match the election type")]
    PayloadMismatch,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_string = self.to_string();
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,

            AppError::Auth(auth) => match auth {
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::InvalidToken
                | AuthError::TokenExpired
                | AuthError::MalformedStageOneToken
                | AuthError::IdentityMismatch
                | AuthError::FaceNotRecognized
                | AuthError::InvalidResetToken
                | AuthError::InvalidUpdateToken => StatusCode::UNAUTHORIZED,
                AuthError::AccountNotApproved | AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
                AuthError::UsernameTaken | AuthError::EmailTaken => StatusCode::CONFLICT,
            },

            AppError::Election(election) => match election {
                ElectionError::ApplicationNotFound | ElectionError::CandidateNotFound => {
                    StatusCode::NOT_FOUND
                }
                _ => StatusCode::BAD_REQUEST,
            },

            AppError::Vote(vote) => match vote {
                VoteError::AlreadyVoted => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },

            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::FaceService(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "status": status.as_u16(),
            "message": error_string,
            "timestamp": chrono::Utc::now()
        }));

        (status, body).into_response()
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// Maps the driver's duplicate-key write failure onto a domain error so a
/// concurrent second vote surfaces as a conflict instead of a 500.
pub fn vote_insert_error(err: mongodb::error::Error) -> AppError {
    use mongodb::error::{ErrorKind, WriteFailure};
    if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = err.kind.as_ref() {
        if write_error.code == 11000 {
            return AppError::Vote(VoteError::AlreadyVoted);
        }
    }
    AppError::Database(err.to_string())
}
