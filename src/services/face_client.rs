use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AppError;

/// HTTP client for the external face recognition collaborator. The service
/// owns all biometric matching; we only ship images and read back usernames.
#[derive(Debug, Clone)]
pub struct FaceClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    images: &'a [String],
}

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    image: &'a str,
}

#[derive(Deserialize)]
struct RecognizeResponse {
    username: String,
}

impl FaceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build face recognition HTTP client");
        FaceClient {
            http,
            base_url: base_url.into(),
        }
    }

    /// Sends the registration images for a new account. A failure here fails
    /// the registration: an account without face data cannot finish login.
    pub async fn register(&self, username: &str, images: &[String]) -> Result<(), AppError> {
        info!(username, count = images.len(), "Registering face images");
        let response = self
            .http
            .post(format!("{}/register", self.base_url))
            .json(&RegisterRequest { username, images })
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            warn!(username, %status, "Face registration rejected by service");
            Err(AppError::FaceService(format!(
                "registration failed with status {status}"
            )))
        }
    }

    /// Recognizes the face in the image, returning the matched username or
    /// `None` when the service reports no match.
    pub async fn recognize(&self, image: &str) -> Result<Option<String>, AppError> {
        let response = self
            .http
            .post(format!("{}/recognize", self.base_url))
            .json(&RecognizeRequest { image })
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::FaceService(format!(
                "recognition failed with status {status}"
            )));
        }

        let body: RecognizeResponse = response
            .json()
            .await
            .map_err(|err| AppError::FaceService(err.to_string()))?;
        if body.username == "Unknown" {
            Ok(None)
        } else {
            Ok(Some(body.username))
        }
    }

    /// Verifies that the face in the image belongs to the expected user.
    pub async fn verify(&self, expected_username: &str, image: &str) -> Result<bool, AppError> {
        let recognized = self.recognize(image).await?;
        match recognized {
            Some(username) => {
                let verified = username.eq_ignore_ascii_case(expected_username);
                if !verified {
                    warn!(
                        expected = expected_username,
                        recognized = %username,
                        "Face verification mismatch"
                    );
                }
                Ok(verified)
            }
            None => Ok(false),
        }
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    AppError::FaceService(format!("service unreachable: {err}"))
}
