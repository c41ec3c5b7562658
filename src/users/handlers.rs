use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{PublicUser, RateUserBody, UserData, UserListData, UserListQuery};
use super::repo::{self, UserSearch};
use crate::auth::jwt::AuthUser;
use crate::error::{ApiError, FieldError};
use crate::extract::ApiJson;
use crate::params::{self, PageInfo};
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /users — public directory search.
#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(q): Query<UserListQuery>,
) -> Result<Json<ApiResponse<UserListData>>, ApiError> {
    let page = params::clamp_page(q.page);
    let limit = params::clamp_limit(q.limit);

    let filter = UserSearch {
        search: params::non_empty(q.search),
        availability: q.availability,
        skills_offered: params::non_empty(q.skills_offered),
        skills_wanted: params::non_empty(q.skills_wanted),
    };

    let users = repo::search(&state.db, &filter, limit, params::offset(page, limit)).await?;
    let total = repo::count_search(&state.db, &filter).await?;

    Ok(ApiResponse::data(UserListData {
        users: users.into_iter().map(PublicUser::from).collect(),
        pagination: PageInfo::new(page, limit, total),
    }))
}

/// GET /users/:id
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserData>>, ApiError> {
    let user = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::data(UserData { user: user.into() }))
}

/// GET /users/name/:name — axum URL-decodes the path segment.
#[instrument(skip(state))]
pub async fn get_user_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<UserData>>, ApiError> {
    let user = repo::find_active_by_name(&state.db, &name)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(ApiResponse::data(UserData { user: user.into() }))
}

/// POST /users/:id/rate — standalone rating submission. Routed through the
/// same atomic fold as request completion, so there is a single source of
/// truth for rating mutations.
#[instrument(skip(state, body))]
pub async fn rate_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<RateUserBody>,
) -> Result<Json<ApiResponse<UserData>>, ApiError> {
    let mut errors = Vec::new();
    let rating = match body.parsed_rating() {
        Some(r) => r,
        None => {
            errors.push(FieldError::new("rating", "Rating must be between 1 and 5"));
            0
        }
    };
    if body
        .review
        .as_deref()
        .is_some_and(|r| params::exceeds_chars(r, 300))
    {
        errors.push(FieldError::new(
            "review",
            "Review cannot be more than 300 characters",
        ));
    }
    if !errors.is_empty() {
        warn!(user_id = %id, "rate_user validation failed");
        return Err(ApiError::Validation(errors));
    }

    let user = repo::apply_rating(&state.db, id, rating)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(rater = %caller, rated = %id, rating, "rating submitted");
    Ok(ApiResponse::with_message(
        "Rating submitted successfully",
        UserData { user: user.into() },
    ))
}
