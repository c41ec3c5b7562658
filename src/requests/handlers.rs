use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    CompleteBody, CreateRequestBody, ListRequestsQuery, RequestData, RequestListData,
    SwapRequestDetails, UpdateStatusBody,
};
use super::policy;
use super::repo::{self, RequestStatus};
use crate::auth::jwt::AuthUser;
use crate::error::{on_duplicate, ApiError, FieldError};
use crate::extract::ApiJson;
use crate::params::{self, PageInfo};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::users;

/// GET /requests — the caller's sent/received requests, newest first.
#[instrument(skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListRequestsQuery>,
) -> Result<Json<ApiResponse<RequestListData>>, ApiError> {
    let page = params::clamp_page(q.page);
    let limit = params::clamp_limit(q.limit);
    let direction = q.direction.as_str();

    let rows = repo::list(
        &state.db,
        user_id,
        direction,
        q.status,
        limit,
        params::offset(page, limit),
    )
    .await?;
    let total = repo::count(&state.db, user_id, direction, q.status).await?;

    Ok(ApiResponse::data(RequestListData {
        requests: rows.into_iter().map(SwapRequestDetails::from).collect(),
        pagination: PageInfo::new(page, limit, total),
    }))
}

/// POST /requests — open a pending swap request.
#[instrument(skip(state, body))]
pub async fn create_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(body): ApiJson<CreateRequestBody>,
) -> Result<(StatusCode, Json<ApiResponse<RequestData>>), ApiError> {
    let mut errors = Vec::new();
    let to_user_id = match body.parsed_to_user() {
        Some(id) => id,
        None => {
            errors.push(FieldError::new("toUserId", "Valid user ID is required"));
            Uuid::nil()
        }
    };
    if body.skills_offered.is_empty() {
        errors.push(FieldError::new(
            "skillsOffered",
            "At least one skill offered is required",
        ));
    }
    if body.skills_wanted.is_empty() {
        errors.push(FieldError::new(
            "skillsWanted",
            "At least one skill wanted is required",
        ));
    }
    let message = body.message.unwrap_or_default();
    if params::exceeds_chars(&message, 500) {
        errors.push(FieldError::new(
            "message",
            "Message cannot be more than 500 characters",
        ));
    }
    if !errors.is_empty() {
        warn!("create_request validation failed");
        return Err(ApiError::Validation(errors));
    }
    if users::repo::find_by_id(&state.db, to_user_id).await?.is_none() {
        return Err(ApiError::not_found("Target user not found"));
    }
    if to_user_id == user_id {
        return Err(ApiError::validation_field(
            "toUserId",
            "Cannot send request to yourself",
        ));
    }

    let id = repo::insert(
        &state.db,
        user_id,
        to_user_id,
        &body.skills_offered,
        &body.skills_wanted,
        &message,
    )
    .await
    .map_err(|e| on_duplicate(e, "You already have a pending request with this user"))?;

    let row = repo::details(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("created request {id} not found")))?;

    info!(request_id = %id, from = %user_id, to = %to_user_id, "swap request created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "Request sent successfully",
            RequestData { request: row.into() },
        ),
    ))
}

/// GET /requests/:id — participants only.
#[instrument(skip(state))]
pub async fn get_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RequestData>>, ApiError> {
    let request = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Request not found"))?;
    policy::ensure_participant(&request, user_id)?;

    let row = repo::details(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Request not found"))?;
    Ok(ApiResponse::data(RequestData { request: row.into() }))
}

/// PUT /requests/:id/status — recipient accepts or rejects while pending.
#[instrument(skip(state, body))]
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<UpdateStatusBody>,
) -> Result<Json<ApiResponse<RequestData>>, ApiError> {
    let mut errors = Vec::new();
    let status = match body.parsed_status() {
        Some(s) => s,
        None => {
            errors.push(FieldError::new(
                "status",
                "Status must be accepted or rejected",
            ));
            RequestStatus::Pending
        }
    };
    let response_message = body.response_message.unwrap_or_default();
    if params::exceeds_chars(&response_message, 500) {
        errors.push(FieldError::new(
            "responseMessage",
            "Response message cannot be more than 500 characters",
        ));
    }
    if !errors.is_empty() {
        warn!(request_id = %id, "update_status validation failed");
        return Err(ApiError::Validation(errors));
    }

    let request = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Request not found"))?;
    policy::ensure_recipient(&request, user_id)?;
    policy::ensure_pending(&request)?;

    // Conditional on still-pending: a concurrent responder loses here.
    if !repo::respond(&state.db, id, status, &response_message).await? {
        return Err(ApiError::conflict("Request has already been processed"));
    }

    let row = repo::details(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Request not found"))?;

    let verb = match status {
        RequestStatus::Accepted => "accepted",
        _ => "rejected",
    };
    info!(request_id = %id, status = verb, "swap request responded");
    Ok(ApiResponse::with_message(
        format!("Request {verb} successfully"),
        RequestData { request: row.into() },
    ))
}

/// PUT /requests/:id/complete — either participant completes an accepted
/// swap and rates the counterparty. Status write and rating fold commit in
/// one transaction.
#[instrument(skip(state, body))]
pub async fn complete_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(body): ApiJson<CompleteBody>,
) -> Result<Json<ApiResponse<RequestData>>, ApiError> {
    let mut errors = Vec::new();
    let rating = match body.parsed_rating() {
        Some(r) => r,
        None => {
            errors.push(FieldError::new("rating", "Rating must be between 1 and 5"));
            0
        }
    };
    let review = body.review.unwrap_or_default();
    if params::exceeds_chars(&review, 300) {
        errors.push(FieldError::new(
            "review",
            "Review cannot be more than 300 characters",
        ));
    }
    if !errors.is_empty() {
        warn!(request_id = %id, "complete_request validation failed");
        return Err(ApiError::Validation(errors));
    }

    let request = repo::find(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Request not found"))?;
    policy::ensure_participant(&request, user_id)?;
    policy::ensure_accepted(&request)?;

    let rated_user = policy::other_participant(&request, user_id);

    let mut tx = state.db.begin().await?;
    if !repo::complete(&mut tx, id, rating, &review).await? {
        return Err(ApiError::conflict("Only accepted requests can be completed"));
    }
    users::repo::apply_rating(&mut *tx, rated_user, rating).await?;
    tx.commit().await?;

    let row = repo::details(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Request not found"))?;

    info!(request_id = %id, by = %user_id, rated = %rated_user, rating, "swap completed");
    Ok(ApiResponse::with_message(
        "Request completed successfully",
        RequestData { request: row.into() },
    ))
}
