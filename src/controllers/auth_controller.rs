use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Multipart},
    http::StatusCode,
};
use base64::Engine;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use mongodb::bson::doc;
use mongodb::Database;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::settings::Settings;
use crate::dtos::requests::{
    FaceImageDTO, LoginDTO, RegistrationForm, ResetPasswordDTO, UpdateProfileDTO, VerifyFaceDTO,
};
use crate::dtos::responses::{
    ApiResponse, AuthTokenData, ResetTokenData, StageOneData, UpdateTokenData, UserDTO,
};
use crate::error::{AppError, AuthError};
use crate::middleware::auth::AuthUser;
use crate::models::user::{validate_id_number, validate_phone_number, Gender, Role, User};
use crate::repositories::user_repository::UserRepository;
use crate::services::face_client::FaceClient;
use crate::utils::{jwt, one_time_token, password};

const MIN_PASSWORD_LEN: usize = 6;
const RESET_TOKEN_TTL_MIN: i64 = 10;
const UPDATE_TOKEN_TTL_MIN: i64 = 15;

//?POST:: api/v1/auth/register
pub async fn register(
    Extension(db): Extension<Arc<Database>>,
    Extension(settings): Extension<Arc<Settings>>,
    Extension(face): Extension<FaceClient>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<UserDTO>>), AppError> {
    let form = collect_registration_form(multipart, &settings).await?;
    let user_repository = UserRepository::new(db);

    validate_registration(&form)?;
    let role = parse_role(&form.role)?;
    let gender = parse_gender(&form.gender)?;
    let birth_date = parse_birth_date(&form.birth_date)?;
    let email = form.email.trim().to_lowercase();

    if user_repository.find_by_email(&email).await?.is_some() {
        return Err(AuthError::EmailTaken.into());
    }
    if user_repository
        .find_by_username(&form.username)
        .await?
        .is_some()
    {
        return Err(AuthError::UsernameTaken.into());
    }

    let password_hash = password::hash_password(&form.password)?;

    // The face service must know this account before stage-two login can ever
    // succeed, so a rejection here fails the whole registration.
    face.register(&form.username, &form.profile_images).await?;

    let user = User {
        id: None,
        name: form.name.trim().to_string(),
        username: form.username.trim().to_string(),
        email,
        password: password_hash,
        role,
        profile_image: form
            .profile_images
            .first()
            .cloned()
            .unwrap_or_default(),
        id_number: form.id_number.clone(),
        cv_path: form.cv_path.clone().unwrap_or_default(),
        birth_date,
        gender,
        street: form.street.clone(),
        city: form.city.clone(),
        state: form.state.clone(),
        zip_code: form.zip_code.clone(),
        phone_number: form.phone_number.clone(),
        is_verified: true,
        is_approved: false,
        has_voted: Default::default(),
        bookmarked_elections: Vec::new(),
        reset_password_token: None,
        reset_password_expire: None,
        profile_update_token: None,
        profile_update_expire: None,
        created_at: Utc::now(),
    };

    let id = user_repository.insert(&user).await?;
    info!(username = %user.username, "New account registered, awaiting approval");

    let mut stored = user;
    stored.id = Some(id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            "Registration successful, your account is awaiting admin approval",
            UserDTO::from(&stored),
        )),
    ))
}

//?POST:: api/v1/auth/login
pub async fn login(
    Extension(db): Extension<Arc<Database>>,
    Extension(settings): Extension<Arc<Settings>>,
    Json(payload): Json<LoginDTO>,
) -> Result<Json<ApiResponse<StageOneData>>, AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".into(),
        ));
    }

    let user_repository = UserRepository::new(db);
    let user = user_repository
        .find_by_email(&payload.email.trim().to_lowercase())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !password::verify_password(&user.password, &payload.password) {
        return Err(AuthError::InvalidCredentials.into());
    }
    if !user.is_approved {
        return Err(AuthError::AccountNotApproved.into());
    }

    let stage_one_token = jwt::create_stage_one_token(
        &user.id_hex(),
        &user.username,
        settings.jwt_secret.as_bytes(),
    )?;

    Ok(Json(ApiResponse::ok(
        "Password verified, proceed to face verification",
        StageOneData {
            stage_one_token,
            username: user.username,
        },
    )))
}

//?POST:: api/v1/auth/verifyface
pub async fn verify_face(
    Extension(db): Extension<Arc<Database>>,
    Extension(settings): Extension<Arc<Settings>>,
    Extension(face): Extension<FaceClient>,
    Json(payload): Json<VerifyFaceDTO>,
) -> Result<Json<ApiResponse<AuthTokenData>>, AppError> {
    if payload.image.trim().is_empty() {
        return Err(AppError::Validation("A captured image is required".into()));
    }

    let claims = jwt::verify_stage_one_token(&payload.stage_one_token, settings.jwt_secret.as_bytes())?;
    if !claims.username.eq_ignore_ascii_case(&payload.username) {
        return Err(AuthError::IdentityMismatch.into());
    }

    let user_repository = UserRepository::new(db);
    let id = super::parse_object_id(&claims.sub, "user")?;
    let user = user_repository
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;

    if !face.verify(&user.username, &payload.image).await? {
        warn!(username = %user.username, "Second factor rejected");
        return Err(AuthError::FaceNotRecognized.into());
    }

    let token = jwt::create_session_token(&user.id_hex(), user.role, settings.jwt_secret.as_bytes())?;
    info!(username = %user.username, "Login completed");

    Ok(Json(ApiResponse::ok(
        "Login successful",
        AuthTokenData {
            token,
            user: UserDTO::from(&user),
        },
    )))
}

//*GET:: api/v1/auth/me
pub async fn me(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserDTO>>, AppError> {
    let user_repository = UserRepository::new(db);
    let user = user_repository
        .find_by_id(&auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;

    Ok(Json(ApiResponse::ok(
        "Current user fetched successfully",
        UserDTO::from(&user),
    )))
}

//?POST:: api/v1/auth/request-password-reset-face-verify
pub async fn request_password_reset(
    Extension(db): Extension<Arc<Database>>,
    Extension(face): Extension<FaceClient>,
    Json(payload): Json<FaceImageDTO>,
) -> Result<Json<ApiResponse<ResetTokenData>>, AppError> {
    if payload.image.trim().is_empty() {
        return Err(AppError::Validation("A captured image is required".into()));
    }

    let recognized = face
        .recognize(&payload.image)
        .await?
        .ok_or(AuthError::FaceNotRecognized)?;

    let user_repository = UserRepository::new(db);
    let user = user_repository
        .find_by_username(&recognized)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;

    let issued = one_time_token::issue();
    let user_id = user.id.ok_or(AppError::Internal)?;
    user_repository
        .set_reset_token(
            &user_id,
            &issued.digest,
            Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MIN),
        )
        .await?;
    info!(username = %user.username, "Password reset token issued");

    Ok(Json(ApiResponse::ok(
        "Face verified, use the reset token to set a new password",
        ResetTokenData {
            reset_token: issued.token,
        },
    )))
}

//?POST:: api/v1/auth/reset-password-with-token
pub async fn reset_password(
    Extension(db): Extension<Arc<Database>>,
    Json(payload): Json<ResetPasswordDTO>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    if payload.new_password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let user_repository = UserRepository::new(db);
    let user = user_repository
        .find_by_reset_digest(&one_time_token::digest(&payload.reset_token))
        .await?
        .ok_or(AuthError::InvalidResetToken)?;

    let user_id = user.id.ok_or(AppError::Internal)?;
    let password_hash = password::hash_password(&payload.new_password)?;
    user_repository.set_password(&user_id, &password_hash).await?;
    info!(username = %user.username, "Password reset completed");

    Ok(Json(ApiResponse::with_status(
        StatusCode::OK,
        "Password has been reset, you can now log in",
        None,
    )))
}

//?POST:: api/v1/auth/verify-face-for-profile-update
pub async fn request_profile_update(
    Extension(db): Extension<Arc<Database>>,
    Extension(face): Extension<FaceClient>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<FaceImageDTO>,
) -> Result<Json<ApiResponse<UpdateTokenData>>, AppError> {
    if payload.image.trim().is_empty() {
        return Err(AppError::Validation("A captured image is required".into()));
    }

    let user_repository = UserRepository::new(db);
    let user = user_repository
        .find_by_id(&auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".into()))?;

    if !face.verify(&user.username, &payload.image).await? {
        return Err(AuthError::FaceNotRecognized.into());
    }

    let issued = one_time_token::issue();
    user_repository
        .set_profile_update_token(
            &auth.id,
            &issued.digest,
            Utc::now() + Duration::minutes(UPDATE_TOKEN_TTL_MIN),
        )
        .await?;

    Ok(Json(ApiResponse::ok(
        "Face verified, use the update token to change your profile",
        UpdateTokenData {
            update_token: issued.token,
        },
    )))
}

//?PUT:: api/v1/auth/update-profile
pub async fn update_profile(
    Extension(db): Extension<Arc<Database>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileDTO>,
) -> Result<Json<ApiResponse<UserDTO>>, AppError> {
    let mut fields = doc! {};
    if let Some(name) = payload.name.as_deref().map(str::trim) {
        if name.is_empty() {
            return Err(AppError::Validation("Name cannot be empty".into()));
        }
        fields.insert("name", name);
    }
    if let Some(phone) = payload.phone_number.as_deref() {
        if !validate_phone_number(phone) {
            return Err(AppError::Validation("Invalid phone number format".into()));
        }
        fields.insert("phoneNumber", phone);
    }
    if let Some(street) = payload.street.as_deref() {
        fields.insert("street", street);
    }
    if let Some(city) = payload.city.as_deref() {
        fields.insert("city", city);
    }
    if let Some(state) = payload.state.as_deref() {
        fields.insert("state", state);
    }
    if fields.is_empty() {
        return Err(AppError::Validation(
            "At least one updatable field is required".into(),
        ));
    }

    let user_repository = UserRepository::new(db);
    let updated = user_repository
        .apply_profile_update(
            &auth.id,
            &one_time_token::digest(&payload.update_token),
            fields,
        )
        .await?
        .ok_or(AuthError::InvalidUpdateToken)?;

    Ok(Json(ApiResponse::ok(
        "Profile updated successfully",
        UserDTO::from(&updated),
    )))
}

async fn collect_registration_form(
    mut multipart: Multipart,
    settings: &Settings,
) -> Result<RegistrationForm, AppError> {
    let mut form = RegistrationForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("Malformed multipart body: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => form.name = field.text().await.unwrap_or_default(),
            "username" => form.username = field.text().await.unwrap_or_default(),
            "email" => form.email = field.text().await.unwrap_or_default(),
            "password" => form.password = field.text().await.unwrap_or_default(),
            "role" => form.role = field.text().await.unwrap_or_default(),
            "idNumber" => form.id_number = field.text().await.unwrap_or_default(),
            "birthDate" => form.birth_date = field.text().await.unwrap_or_default(),
            "gender" => form.gender = field.text().await.unwrap_or_default(),
            "street" => form.street = field.text().await.unwrap_or_default(),
            "city" => form.city = field.text().await.unwrap_or_default(),
            "state" => form.state = field.text().await.unwrap_or_default(),
            "zipCode" => form.zip_code = field.text().await.ok().filter(|z| !z.is_empty()),
            "phoneNumber" => form.phone_number = field.text().await.unwrap_or_default(),
            "profileImages" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::Validation(format!("Unreadable image: {err}")))?;
                form.profile_images
                    .push(base64::engine::general_purpose::STANDARD.encode(&bytes));
            }
            "cv" => {
                let file_name = field.file_name().unwrap_or("cv.pdf").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::Validation(format!("Unreadable CV: {err}")))?;
                form.cv_path = Some(store_upload(settings, &file_name, &bytes).await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Persists an uploaded file under the configured upload directory with a
/// generated name, returning the stored relative path.
pub(crate) async fn store_upload(
    settings: &Settings,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let extension = std::path::Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("bin");
    let stored = format!("{}/{}.{}", settings.upload_dir, Uuid::new_v4(), extension);

    tokio::fs::create_dir_all(&settings.upload_dir)
        .await
        .map_err(|err| AppError::Storage(format!("Upload directory unavailable: {err}")))?;
    tokio::fs::write(&stored, bytes)
        .await
        .map_err(|err| AppError::Storage(format!("Failed to store upload: {err}")))?;
    Ok(stored)
}

fn validate_registration(form: &RegistrationForm) -> Result<(), AppError> {
    let required = [
        ("name", &form.name),
        ("username", &form.username),
        ("email", &form.email),
        ("password", &form.password),
        ("role", &form.role),
        ("idNumber", &form.id_number),
        ("birthDate", &form.birth_date),
        ("gender", &form.gender),
        ("street", &form.street),
        ("city", &form.city),
        ("state", &form.state),
        ("phoneNumber", &form.phone_number),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("Field '{field}' is required")));
        }
    }
    if form.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if !validate_id_number(&form.id_number) {
        return Err(AppError::Validation(
            "National ID number must be exactly 14 digits".into(),
        ));
    }
    if !validate_phone_number(&form.phone_number) {
        return Err(AppError::Validation("Invalid phone number format".into()));
    }
    if form.profile_images.is_empty() {
        return Err(AppError::Validation(
            "At least one profile image is required".into(),
        ));
    }
    Ok(())
}

fn parse_role(value: &str) -> Result<Role, AppError> {
    match value {
        "voter" => Ok(Role::Voter),
        "candidate" => Ok(Role::Candidate),
        other => Err(AppError::Validation(format!(
            "Role must be 'voter' or 'candidate', got '{other}'"
        ))),
    }
}

fn parse_gender(value: &str) -> Result<Gender, AppError> {
    match value {
        "male" => Ok(Gender::Male),
        "female" => Ok(Gender::Female),
        other => Err(AppError::Validation(format!(
            "Gender must be 'male' or 'female', got '{other}'"
        ))),
    }
}

fn parse_birth_date(value: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::Validation("Invalid birth date".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birth_date_accepts_both_formats() {
        assert!(parse_birth_date("2001-05-14").is_ok());
        assert!(parse_birth_date("2001-05-14T00:00:00Z").is_ok());
        assert!(parse_birth_date("14/05/2001").is_err());
    }

    #[test]
    fn role_parsing_excludes_admin_self_registration() {
        assert!(parse_role("voter").is_ok());
        assert!(parse_role("candidate").is_ok());
        assert!(parse_role("admin").is_err());
    }

    #[test]
    fn registration_requires_profile_image() {
        let form = RegistrationForm {
            name: "Alaa".into(),
            username: "alaa".into(),
            email: "a@b.c".into(),
            password: "secret1".into(),
            role: "voter".into(),
            id_number: "12345678901234".into(),
            birth_date: "2001-05-14".into(),
            gender: "female".into(),
            street: "Main".into(),
            city: "Cairo".into(),
            state: "Cairo".into(),
            phone_number: "01001234567".into(),
            ..Default::default()
        };
        assert!(validate_registration(&form).is_err());

        let mut with_image = form;
        with_image.profile_images.push("aGVsbG8=".into());
        assert!(validate_registration(&with_image).is_ok());
    }
}
