use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use std::path::Path;
use tracing::info;

use waypoint_db::models::{NewUser, ProfileUpdate};
use waypoint_types::api::{
    Claims, HealthResponse, LoginRequest, LoginResponse, MessageResponse, ProfileResponse,
    RegisterRequest, UpdateProfileRequest,
};
use waypoint_types::validate::{ValidationError, optional_birthday};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::middleware::create_token;
use crate::state::{AppState, with_db};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if req.username.trim().is_empty() {
        return Err(ValidationError::Required("username").into());
    }
    if req.email.trim().is_empty() {
        return Err(ValidationError::Required("email").into());
    }
    if req.password.is_empty() {
        return Err(ValidationError::Required("password").into());
    }
    let birthday = optional_birthday(req.birthday.as_deref())?;

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))?
        .to_string();

    let username = req.username.clone();
    let created = with_db(&state, move |db| {
        db.create_user(&NewUser {
            username: &req.username,
            email: &req.email,
            password_hash: &password_hash,
            nickname: req.nickname.as_deref(),
            birthday,
            phone: req.phone.as_deref(),
        })
    })
    .await?;

    let Some(user_id) = created else {
        return Err(ApiError::Conflict("Username already exists".into()));
    };
    info!("Registered user {} ({})", username, user_id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Registration successful")),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.clone();
    let user = with_db(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash unreadable: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let token = create_token(&state.jwt_secret, user.id, &user.username, state.token_ttl)?;

    Ok(Json(LoginResponse { token }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = with_db(&state, move |db| db.get_user_by_id(claims.sub))
        .await?
        .ok_or(ApiError::NotFound)?;

    // Preferences are opaque; stored text that is not JSON comes back as a string
    let preferences = user.preferences.map(|raw| {
        serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
    });

    Ok(Json(ProfileResponse {
        username: user.username,
        email: user.email,
        nickname: user.nickname,
        birthday: user.birthday,
        phone: user.phone,
        preferences,
    }))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let update = ProfileUpdate {
        nickname: req.nickname,
        email: req.email,
        birthday: optional_birthday(req.birthday.as_deref())?,
        phone: req.phone,
        preferences: req.preferences.map(|v| v.to_string()),
    };

    let found = with_db(&state, move |db| db.update_profile(claims.sub, &update)).await?;
    if !found {
        return Err(ApiError::NotFound);
    }

    Ok(Json(MessageResponse::new("Profile updated")))
}

/// Deletes the account and everything it owns, then removes its photo files.
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = claims.sub;
    let paths = with_db(&state, move |db| db.delete_user(user_id))
        .await?
        .ok_or(ApiError::NotFound)?;

    for path in &paths {
        state.storage.discard(Path::new(path)).await;
    }
    info!("Deleted user {} and {} photo file(s)", claims.username, paths.len());

    Ok(Json(MessageResponse::new("Account deleted")))
}
