use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

/// Bare request row, used for authorization and state checks.
#[derive(Debug, Clone, FromRow)]
pub struct SwapRequestRow {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub message: String,
    pub status: RequestStatus,
    pub response_message: String,
    pub completed_at: Option<OffsetDateTime>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Request row joined with both participants' public fields.
#[derive(Debug, Clone, FromRow)]
pub struct SwapRequestDetailsRow {
    pub id: Uuid,
    pub from_user: Uuid,
    pub to_user: Uuid,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub message: String,
    pub status: RequestStatus,
    pub response_message: String,
    pub completed_at: Option<OffsetDateTime>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub from_name: String,
    pub from_avatar: String,
    pub from_rating: f64,
    pub to_name: String,
    pub to_avatar: String,
    pub to_rating: f64,
}

const COLUMNS: &str = "id, from_user, to_user, skills_offered, skills_wanted, message, status, \
     response_message, completed_at, rating, review, created_at, updated_at";

const DETAIL_COLUMNS: &str = "r.id, r.from_user, r.to_user, r.skills_offered, r.skills_wanted, \
     r.message, r.status, r.response_message, r.completed_at, r.rating, r.review, \
     r.created_at, r.updated_at, \
     fu.name AS from_name, fu.avatar AS from_avatar, fu.rating AS from_rating, \
     tu.name AS to_name, tu.avatar AS to_avatar, tu.rating AS to_rating";

const DETAIL_JOIN: &str =
    "requests r JOIN users fu ON fu.id = r.from_user JOIN users tu ON tu.id = r.to_user";

pub async fn find(db: &PgPool, id: Uuid) -> Result<Option<SwapRequestRow>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM requests WHERE id = $1");
    sqlx::query_as::<_, SwapRequestRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn details(db: &PgPool, id: Uuid) -> Result<Option<SwapRequestDetailsRow>, sqlx::Error> {
    let sql = format!("SELECT {DETAIL_COLUMNS} FROM {DETAIL_JOIN} WHERE r.id = $1");
    sqlx::query_as::<_, SwapRequestDetailsRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

/// New requests start pending; the partial unique index rejects a second
/// pending request for the same pair with 23505.
pub async fn insert(
    db: &PgPool,
    from_user: Uuid,
    to_user: Uuid,
    skills_offered: &[String],
    skills_wanted: &[String],
    message: &str,
) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO requests (from_user, to_user, skills_offered, skills_wanted, message) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(from_user)
    .bind(to_user)
    .bind(skills_offered)
    .bind(skills_wanted)
    .bind(message)
    .fetch_one(db)
    .await
}

/// Direction filter: `$2` is 'sent', 'received' or 'all'.
const LIST_FILTER: &str = "(($2::text = 'sent' AND r.from_user = $1) \
      OR ($2::text = 'received' AND r.to_user = $1) \
      OR ($2::text = 'all' AND (r.from_user = $1 OR r.to_user = $1))) \
     AND ($3::request_status IS NULL OR r.status = $3)";

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    direction: &str,
    status: Option<RequestStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<SwapRequestDetailsRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {DETAIL_COLUMNS} FROM {DETAIL_JOIN} WHERE {LIST_FILTER} \
         ORDER BY r.created_at DESC LIMIT $4 OFFSET $5"
    );
    sqlx::query_as::<_, SwapRequestDetailsRow>(&sql)
        .bind(user_id)
        .bind(direction)
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

pub async fn count(
    db: &PgPool,
    user_id: Uuid,
    direction: &str,
    status: Option<RequestStatus>,
) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM requests r WHERE {LIST_FILTER}");
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(user_id)
        .bind(direction)
        .bind(status)
        .fetch_one(db)
        .await
}

/// Conditional accept/reject. Returns false when the row was no longer
/// pending, which a racing responder may have caused.
pub async fn respond(
    db: &PgPool,
    id: Uuid,
    status: RequestStatus,
    response_message: &str,
) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query_scalar::<_, Uuid>(
        "UPDATE requests SET status = $2, response_message = $3, updated_at = now() \
         WHERE id = $1 AND status = 'pending' RETURNING id",
    )
    .bind(id)
    .bind(status)
    .bind(response_message)
    .fetch_optional(db)
    .await?;
    Ok(updated.is_some())
}

/// Conditional completion inside the caller's transaction, so the status
/// write and the counterparty rating fold commit as one unit.
pub async fn complete(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    rating: i32,
    review: &str,
) -> Result<bool, sqlx::Error> {
    let updated = sqlx::query_scalar::<_, Uuid>(
        "UPDATE requests SET status = 'completed', completed_at = now(), rating = $2, \
             review = $3, updated_at = now() \
         WHERE id = $1 AND status = 'accepted' RETURNING id",
    )
    .bind(id)
    .bind(rating)
    .bind(review)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(updated.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Pending).unwrap(),
            r#""pending""#
        );
        let parsed: RequestStatus = serde_json::from_str(r#""accepted""#).unwrap();
        assert_eq!(parsed, RequestStatus::Accepted);
        assert!(serde_json::from_str::<RequestStatus>(r#""done""#).is_err());
    }
}
