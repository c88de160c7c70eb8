use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::app;
use crate::config::settings::Settings;
use crate::models::user::Role;
use crate::utils::jwt;

pub const TEST_JWT_SECRET: &str = "test-suite-secret";

fn test_settings() -> Settings {
    Settings {
        mongo_uri: "mongodb://localhost:27017".into(),
        database_name: "electra_test".into(),
        jwt_secret: TEST_JWT_SECRET.into(),
        face_api_url: "http://localhost:5001".into(),
        bind_addr: "127.0.0.1:0".into(),
        cors_origin: "http://localhost:5173".into(),
        upload_dir: "uploads-test".into(),
        auto_status_updates: false,
    }
}

/// Builds the real router against a lazily-connected client. The driver only
/// touches the network on the first query, so requests that fail before any
/// repository call run without a database.
pub async fn setup_test_app() -> Router {
    let settings = Arc::new(test_settings());
    let client = mongodb::Client::with_uri_str(&settings.mongo_uri)
        .await
        .expect("client options are static and valid");
    let db = Arc::new(client.database(&settings.database_name));
    app::create_app(db, settings)
}

pub fn session_token_for(role: Role) -> String {
    let user_id = mongodb::bson::oid::ObjectId::new().to_hex();
    jwt::create_session_token(&user_id, role, TEST_JWT_SECRET.as_bytes())
        .expect("token creation cannot fail with a static secret")
}

pub async fn send_request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request construction"),
        None => builder.body(Body::empty()).expect("request construction"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router never errors");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
