use axum::{
    extract::{Path, Query, State},
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    CategoriesData, CreateSkillBody, PopularQuery, Skill, SkillData, SkillListData, SkillListQuery,
};
use super::repo;
use crate::auth::jwt::AuthUser;
use crate::error::{on_duplicate, ApiError, FieldError};
use crate::extract::ApiJson;
use crate::params;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /skills — catalog search.
#[instrument(skip(state))]
pub async fn list_skills(
    State(state): State<AppState>,
    Query(q): Query<SkillListQuery>,
) -> Result<Json<ApiResponse<SkillListData>>, ApiError> {
    let limit = params::clamp_limit(q.limit);
    let search = params::non_empty(q.search);
    let skills = repo::list(&state.db, q.category, search.as_deref(), limit).await?;
    Ok(ApiResponse::data(SkillListData {
        skills: skills.into_iter().map(Skill::from).collect(),
    }))
}

/// GET /skills/categories
#[instrument(skip(state))]
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CategoriesData>>, ApiError> {
    let categories = repo::categories(&state.db).await?;
    Ok(ApiResponse::data(CategoriesData { categories }))
}

/// GET /skills/popular
#[instrument(skip(state))]
pub async fn get_popular(
    State(state): State<AppState>,
    Query(q): Query<PopularQuery>,
) -> Result<Json<ApiResponse<SkillListData>>, ApiError> {
    let skills = repo::popular(&state.db, params::clamp_limit(q.limit)).await?;
    Ok(ApiResponse::data(SkillListData {
        skills: skills.into_iter().map(Skill::from).collect(),
    }))
}

/// POST /skills — create a catalog entry. Names are canonicalized to
/// lower-case; a case-insensitive duplicate is a conflict.
#[instrument(skip(state, body))]
pub async fn create_skill(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateSkillBody>,
) -> Result<(axum::http::StatusCode, Json<ApiResponse<SkillData>>), ApiError> {
    let mut errors = Vec::new();
    let name = body.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Skill name is required"));
    }
    let category = match body.parsed_category() {
        Some(c) => c,
        None => {
            errors.push(FieldError::new("category", "Valid skill category is required"));
            repo::SkillCategory::Other
        }
    };
    let description = body.description.unwrap_or_default();
    if params::exceeds_chars(&description, 200) {
        errors.push(FieldError::new(
            "description",
            "Description cannot be more than 200 characters",
        ));
    }
    if !errors.is_empty() {
        warn!("create_skill validation failed");
        return Err(ApiError::Validation(errors));
    }

    let skill = repo::insert(&state.db, name, category, &description)
        .await
        .map_err(|e| on_duplicate(e, "Skill already exists"))?;

    info!(skill = %skill.name, created_by = %user_id, "skill created");
    Ok((
        axum::http::StatusCode::CREATED,
        ApiResponse::with_message("Skill created successfully", SkillData { skill: skill.into() }),
    ))
}

/// PUT /skills/:id/usage — bump the autocomplete popularity counter.
#[instrument(skip(state))]
pub async fn increment_usage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SkillData>>, ApiError> {
    let skill = repo::increment_usage(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Skill not found"))?;
    Ok(ApiResponse::with_message(
        "Usage count updated",
        SkillData { skill: skill.into() },
    ))
}
