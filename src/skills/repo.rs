use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "skill_category", rename_all = "lowercase")]
pub enum SkillCategory {
    Programming,
    Design,
    Marketing,
    Business,
    Creative,
    Technical,
    Other,
}

#[derive(Debug, Clone, FromRow)]
pub struct SkillRow {
    pub id: Uuid,
    pub name: String,
    pub category: SkillCategory,
    pub description: String,
    pub is_active: bool,
    pub usage_count: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str = "id, name, category, description, is_active, usage_count, created_at, updated_at";

pub async fn list(
    db: &PgPool,
    category: Option<SkillCategory>,
    search: Option<&str>,
    limit: i64,
) -> Result<Vec<SkillRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM skills \
         WHERE is_active = TRUE \
           AND ($1::skill_category IS NULL OR category = $1) \
           AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%') \
         ORDER BY usage_count DESC, name ASC \
         LIMIT $3"
    );
    sqlx::query_as::<_, SkillRow>(&sql)
        .bind(category)
        .bind(search)
        .bind(limit)
        .fetch_all(db)
        .await
}

pub async fn popular(db: &PgPool, limit: i64) -> Result<Vec<SkillRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM skills WHERE is_active = TRUE \
         ORDER BY usage_count DESC LIMIT $1"
    );
    sqlx::query_as::<_, SkillRow>(&sql)
        .bind(limit)
        .fetch_all(db)
        .await
}

pub async fn categories(db: &PgPool) -> Result<Vec<SkillCategory>, sqlx::Error> {
    sqlx::query_scalar::<_, SkillCategory>("SELECT DISTINCT category FROM skills ORDER BY category")
        .fetch_all(db)
        .await
}

/// Inserts with the canonical lower-case name; the unique index rejects
/// case-insensitive duplicates with 23505.
pub async fn insert(
    db: &PgPool,
    name: &str,
    category: SkillCategory,
    description: &str,
) -> Result<SkillRow, sqlx::Error> {
    let sql = format!(
        "INSERT INTO skills (name, category, description) \
         VALUES (lower(trim($1)), $2, $3) RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, SkillRow>(&sql)
        .bind(name)
        .bind(category)
        .bind(description)
        .fetch_one(db)
        .await
}

/// Atomic +1; returns the updated row or None for an unknown id.
pub async fn increment_usage(db: &PgPool, id: Uuid) -> Result<Option<SkillRow>, sqlx::Error> {
    let sql = format!(
        "UPDATE skills SET usage_count = usage_count + 1, updated_at = now() \
         WHERE id = $1 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, SkillRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}
