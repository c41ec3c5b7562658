use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::dto::{AuthData, LoginRequest, RefreshRequest, RegisterRequest, UpdateProfileRequest};
use super::jwt::{AuthUser, JwtKeys};
use super::password::{hash_password, verify_password};
use crate::error::{on_duplicate, ApiError, FieldError};
use crate::extract::ApiJson;
use crate::params;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::users::dto::{PublicUser, UserData};
use crate::users::repo::{self as users_repo, ProfilePatch};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// POST /auth/register
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>), ApiError> {
    let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
    let email = payload
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_default();
    let password = payload.password.as_deref().unwrap_or_default();

    let mut errors = Vec::new();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if params::exceeds_chars(name, 50) {
        errors.push(FieldError::new("name", "Name cannot be more than 50 characters"));
    }
    if !is_valid_email(&email) {
        errors.push(FieldError::new("email", "Please provide a valid email"));
    }
    if password.len() < 8 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters",
        ));
    }
    if !errors.is_empty() {
        warn!("register validation failed");
        return Err(ApiError::Validation(errors));
    }

    if users_repo::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::conflict("Email already registered"));
    }

    let hash = hash_password(password)?;
    let user = users_repo::create(
        &state.db,
        name,
        &email,
        &hash,
        &payload.skills_offered,
        &payload.skills_wanted,
    )
    .await
    .map_err(|e| on_duplicate(e, "Email already registered"))?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "User registered successfully",
            AuthData {
                access_token,
                refresh_token,
                user: PublicUser::from(user),
            },
        ),
    ))
}

/// POST /auth/login
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(mut payload): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    // Same response whether the email or the password is wrong.
    let user = users_repo::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::unauthorized("Invalid credentials")
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(ApiResponse::with_message(
        "Login successful",
        AuthData {
            access_token,
            refresh_token,
            user: PublicUser::from(user),
        },
    ))
}

/// POST /auth/refresh
#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired refresh token"))?;

    let user = users_repo::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    Ok(ApiResponse::data(AuthData {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    }))
}

/// POST /auth/logout — tokens are stateless; the client discards them.
#[instrument]
pub async fn logout(AuthUser(user_id): AuthUser) -> Json<ApiResponse<()>> {
    info!(user_id = %user_id, "user logged out");
    ApiResponse::message("Logged out successfully")
}

/// GET /auth/me
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<UserData>>, ApiError> {
    let user = users_repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;
    Ok(ApiResponse::data(UserData { user: user.into() }))
}

/// PUT /auth/profile — partial profile replacement. Skill lists stay
/// unconstrained strings; the catalog is advisory only.
#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserData>>, ApiError> {
    let mut errors = Vec::new();
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        errors.push(FieldError::new("name", "Name cannot be empty"));
    }
    if payload
        .name
        .as_deref()
        .is_some_and(|n| params::exceeds_chars(n, 50))
    {
        errors.push(FieldError::new("name", "Name cannot be more than 50 characters"));
    }
    if payload
        .bio
        .as_deref()
        .is_some_and(|b| params::exceeds_chars(b, 500))
    {
        errors.push(FieldError::new("bio", "Bio cannot be more than 500 characters"));
    }
    if payload
        .location
        .as_deref()
        .is_some_and(|l| params::exceeds_chars(l, 100))
    {
        errors.push(FieldError::new(
            "location",
            "Location cannot be more than 100 characters",
        ));
    }
    if !errors.is_empty() {
        warn!(user_id = %user_id, "update_profile validation failed");
        return Err(ApiError::Validation(errors));
    }

    let patch = ProfilePatch {
        name: payload.name.map(|n| n.trim().to_string()),
        location: payload.location,
        bio: payload.bio,
        availability: payload.availability,
        skills_offered: payload.skills_offered,
        skills_wanted: payload.skills_wanted,
        avatar: payload.avatar,
    };

    let user = users_repo::update_profile(&state.db, user_id, &patch)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(user_id = %user_id, "profile updated");
    Ok(ApiResponse::with_message(
        "Profile updated successfully",
        UserData { user: user.into() },
    ))
}
