use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Coarse time-slot preference, used only as a directory search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "availability", rename_all = "snake_case")]
pub enum Availability {
    WeekdaysMorning,
    WeekdaysEvening,
    WeekendsMorning,
    WeekendsEvening,
    Anytime,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    pub bio: String,
    pub location: String,
    pub availability: Availability,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub rating: f64,
    pub total_ratings: i32,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

const COLUMNS: &str = "id, name, email, password_hash, avatar, bio, location, availability, \
     skills_offered, skills_wanted, rating, total_ratings, is_active, is_verified, \
     created_at, updated_at";

/// Directory filters; substring matches are case-insensitive.
#[derive(Debug, Default)]
pub struct UserSearch {
    pub search: Option<String>,
    pub availability: Option<Availability>,
    pub skills_offered: Option<String>,
    pub skills_wanted: Option<String>,
}

const SEARCH_FILTER: &str = "is_active = TRUE \
     AND ($1::text IS NULL \
          OR name ILIKE '%' || $1 || '%' \
          OR array_to_string(skills_offered, ' ') ILIKE '%' || $1 || '%' \
          OR array_to_string(skills_wanted, ' ') ILIKE '%' || $1 || '%') \
     AND ($2::availability IS NULL OR availability = $2) \
     AND ($3::text IS NULL OR array_to_string(skills_offered, ' ') ILIKE '%' || $3 || '%') \
     AND ($4::text IS NULL OR array_to_string(skills_wanted, ' ') ILIKE '%' || $4 || '%')";

pub async fn search(
    db: &PgPool,
    filter: &UserSearch,
    limit: i64,
    offset: i64,
) -> Result<Vec<UserRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM users WHERE {SEARCH_FILTER} \
         ORDER BY rating DESC, created_at DESC LIMIT $5 OFFSET $6"
    );
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(&filter.search)
        .bind(filter.availability)
        .bind(&filter.skills_offered)
        .bind(&filter.skills_wanted)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

pub async fn count_search(db: &PgPool, filter: &UserSearch) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM users WHERE {SEARCH_FILTER}");
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(&filter.search)
        .bind(filter.availability)
        .bind(&filter.skills_offered)
        .bind(&filter.skills_wanted)
        .fetch_one(db)
        .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(email)
        .fetch_optional(db)
        .await
}

// Unanchored so partial-name URLs still resolve.
const NAME_LOOKUP_FILTER: &str = "name ILIKE '%' || $1 || '%' AND is_active = TRUE";

/// Case-insensitive substring name lookup among active users.
pub async fn find_active_by_name(db: &PgPool, name: &str) -> Result<Option<UserRow>, sqlx::Error> {
    let sql = format!("SELECT {COLUMNS} FROM users WHERE {NAME_LOOKUP_FILTER} LIMIT 1");
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(name)
        .fetch_optional(db)
        .await
}

pub async fn create(
    db: &PgPool,
    name: &str,
    email: &str,
    password_hash: &str,
    skills_offered: &[String],
    skills_wanted: &[String],
) -> Result<UserRow, sqlx::Error> {
    let sql = format!(
        "INSERT INTO users (name, email, password_hash, skills_offered, skills_wanted) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(skills_offered)
        .bind(skills_wanted)
        .fetch_one(db)
        .await
}

/// Partial profile replacement; omitted fields keep their stored values.
#[derive(Debug, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub availability: Option<Availability>,
    pub skills_offered: Option<Vec<String>>,
    pub skills_wanted: Option<Vec<String>>,
    pub avatar: Option<String>,
}

pub async fn update_profile(
    db: &PgPool,
    id: Uuid,
    patch: &ProfilePatch,
) -> Result<Option<UserRow>, sqlx::Error> {
    let sql = format!(
        "UPDATE users SET \
             name = COALESCE($2, name), \
             location = COALESCE($3, location), \
             bio = COALESCE($4, bio), \
             availability = COALESCE($5, availability), \
             skills_offered = COALESCE($6, skills_offered), \
             skills_wanted = COALESCE($7, skills_wanted), \
             avatar = COALESCE($8, avatar), \
             updated_at = now() \
         WHERE id = $1 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.location)
        .bind(&patch.bio)
        .bind(patch.availability)
        .bind(&patch.skills_offered)
        .bind(&patch.skills_wanted)
        .bind(&patch.avatar)
        .fetch_optional(db)
        .await
}

// Shared by the UPDATE and its unit-test mirror below.
const RATING_FOLD: &str =
    "round(((rating * total_ratings + $2) / (total_ratings + 1))::numeric, 1)::double precision";

/// Folds one rating into a user's running mean in a single statement, so two
/// concurrent ratings for the same user cannot lose an update. Every rating
/// mutation in the crate goes through here.
pub async fn apply_rating<'e, E>(
    db: E,
    user_id: Uuid,
    rating: i32,
) -> Result<Option<UserRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        "UPDATE users SET \
             rating = {RATING_FOLD}, \
             total_ratings = total_ratings + 1, \
             updated_at = now() \
         WHERE id = $1 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(user_id)
        .bind(rating as f64)
        .fetch_optional(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_uses_snake_case_on_the_wire() {
        let json = serde_json::to_string(&Availability::WeekdaysEvening).unwrap();
        assert_eq!(json, r#""weekdays_evening""#);
        let parsed: Availability = serde_json::from_str(r#""weekends_morning""#).unwrap();
        assert_eq!(parsed, Availability::WeekendsMorning);
    }

    #[test]
    fn search_filter_binds_line_up() {
        // The list and count queries share one filter; both bind four params.
        for placeholder in ["$1", "$2", "$3", "$4"] {
            assert!(SEARCH_FILTER.contains(placeholder));
        }
        assert!(!SEARCH_FILTER.contains("$5"));
    }

    #[test]
    fn name_lookup_matches_substrings() {
        assert!(NAME_LOOKUP_FILTER.contains("ILIKE '%' || $1 || '%'"));
        assert!(NAME_LOOKUP_FILTER.contains("is_active = TRUE"));
    }

    // Same arithmetic as RATING_FOLD: running mean, rounded half-up to one
    // decimal, as `round(numeric, 1)` does.
    fn folded_rating(rating: f64, total_ratings: i32, submitted: i32) -> f64 {
        let total = total_ratings as f64;
        let mean = (rating * total + submitted as f64) / (total + 1.0);
        (mean * 10.0).round() / 10.0
    }

    #[test]
    fn rating_fold_rounds_to_one_decimal() {
        // 4.2 over 15 ratings plus a 5 lands on 4.3 with 16 totals.
        assert!((folded_rating(4.2, 15, 5) - 4.3).abs() < 1e-9);
        // First rating becomes the mean outright.
        assert!((folded_rating(0.0, 0, 4) - 4.0).abs() < 1e-9);
        assert!((folded_rating(5.0, 1, 1) - 3.0).abs() < 1e-9);
        assert!((folded_rating(3.7, 3, 2) - 3.3).abs() < 1e-9);
    }

    #[test]
    fn rating_fold_updates_mean_and_rounds_in_the_store() {
        // The UPDATE divides by the pre-increment count plus one and rounds
        // to one decimal before casting back.
        assert!(RATING_FOLD.contains("total_ratings + 1"));
        assert!(RATING_FOLD.contains("round"));
        assert!(RATING_FOLD.contains("::numeric, 1"));
        assert!(RATING_FOLD.contains("::double precision"));
    }
}
