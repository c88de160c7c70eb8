use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;

use super::test_utils::{send_request, session_token_for, setup_test_app};
use crate::models::user::Role;

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = setup_test_app().await;

    for (method, uri) in [
        (Method::GET, "/api/v1/auth/me"),
        (Method::GET, "/api/v1/votes/my-votes"),
        (Method::GET, "/api/v1/elections/bookmarks"),
        (Method::GET, "/api/v1/admin/users"),
        (Method::GET, "/api/v1/stats/voter"),
        (Method::POST, "/api/v1/admin/update-election-statuses"),
    ] {
        let (status, body) = send_request(&app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["success"], json!(false));
    }
}

#[tokio::test]
async fn garbage_bearer_tokens_are_rejected() {
    let app = setup_test_app().await;
    let (status, _) = send_request(
        &app,
        Method::GET,
        "/api/v1/auth/me",
        Some("not.a.jwt"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_other_roles() {
    let app = setup_test_app().await;
    let voter_token = session_token_for(Role::Voter);

    for uri in [
        "/api/v1/admin/users",
        "/api/v1/stats/admin",
    ] {
        let (status, body) =
            send_request(&app, Method::GET, uri, Some(&voter_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["success"], json!(false));
    }
}

#[tokio::test]
async fn role_guards_cover_candidate_and_voter_routes() {
    let app = setup_test_app().await;
    let admin_token = session_token_for(Role::Admin);

    let (status, _) = send_request(
        &app,
        Method::GET,
        "/api/v1/elections/my-applications",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_request(
        &app,
        Method::GET,
        "/api/v1/stats/voter",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_requires_email_and_password() {
    let app = setup_test_app().await;
    let (status, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "", "password": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn verify_face_rejects_forged_stage_one_tokens() {
    let app = setup_test_app().await;
    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/verifyface",
        None,
        Some(json!({
            "stageOneToken": "forged.token.value",
            "image": "aGVsbG8=",
            "username": "alaa"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn a_session_token_is_not_accepted_as_stage_one() {
    let app = setup_test_app().await;
    let session_token = session_token_for(Role::Voter);
    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/auth/verifyface",
        None,
        Some(json!({
            "stageOneToken": session_token,
            "image": "aGVsbG8=",
            "username": "alaa"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_election_ids_are_bad_requests() {
    let app = setup_test_app().await;

    let (status, body) = send_request(
        &app,
        Method::GET,
        "/api/v1/elections/not-a-valid-id",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    let (status, _) = send_request(
        &app,
        Method::GET,
        "/api/v1/elections/not-a-valid-id/votes/results",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_election_validates_before_touching_storage() {
    let app = setup_test_app().await;
    let admin_token = session_token_for(Role::Admin);
    let start = Utc::now();
    let end = start + Duration::days(1);

    // unknown election type
    let (status, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/elections",
        Some(&admin_token),
        Some(json!({
            "title": "Council 2026",
            "description": "Annual council election",
            "electionType": "ranked-choice",
            "startDate": start.to_rfc3339(),
            "endDate": end.to_rfc3339()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    // empty title
    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/elections",
        Some(&admin_token),
        Some(json!({
            "title": "   ",
            "description": "Annual council election",
            "electionType": "yes-no",
            "proposition": "Adopt the proposal?",
            "startDate": start.to_rfc3339(),
            "endDate": end.to_rfc3339()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // inverted dates
    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/elections",
        Some(&admin_token),
        Some(json!({
            "title": "Council 2026",
            "description": "Annual council election",
            "electionType": "yes-no",
            "proposition": "Adopt the proposal?",
            "startDate": end.to_rfc3339(),
            "endDate": start.to_rfc3339()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // yes-no without a proposition
    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/elections",
        Some(&admin_token),
        Some(json!({
            "title": "Council 2026",
            "description": "Annual council election",
            "electionType": "yes-no",
            "startDate": start.to_rfc3339(),
            "endDate": end.to_rfc3339()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_patch_rejects_unknown_statuses() {
    let app = setup_test_app().await;
    let admin_token = session_token_for(Role::Admin);

    let (status, _) = send_request(
        &app,
        Method::PATCH,
        "/api/v1/elections/65f1a2b3c4d5e6f7a8b9c0d1/status",
        Some(&admin_token),
        Some(json!({ "status": "archived" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = setup_test_app().await;
    let (status, _) = send_request(&app, Method::GET, "/api/v1/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
