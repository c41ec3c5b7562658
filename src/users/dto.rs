use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Availability, UserRow};
use crate::params::PageInfo;

/// User as exposed by the API. Built from [`UserRow`], so the password hash
/// can never leak into a response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
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
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<UserRow> for PublicUser {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            avatar: row.avatar,
            bio: row.bio,
            location: row.location,
            availability: row.availability,
            skills_offered: row.skills_offered,
            skills_wanted: row.skills_wanted,
            rating: row.rating,
            total_ratings: row.total_ratings,
            is_active: row.is_active,
            is_verified: row.is_verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Short user reference embedded in swap request payloads.
#[derive(Debug, Serialize)]
pub struct UserBrief {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    pub rating: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    #[serde(default = "crate::params::default_page")]
    pub page: i64,
    #[serde(default = "crate::params::default_limit")]
    pub limit: i64,
    pub search: Option<String>,
    #[serde(default, deserialize_with = "crate::params::empty_string_as_none")]
    pub availability: Option<Availability>,
    pub skills_offered: Option<String>,
    pub skills_wanted: Option<String>,
}

// Lenient on the wire so a fractional or out-of-range value becomes a
// field error instead of a rejected body.
#[derive(Debug, Deserialize)]
pub struct RateUserBody {
    pub rating: Option<f64>,
    pub review: Option<String>,
}

impl RateUserBody {
    pub fn parsed_rating(&self) -> Option<i32> {
        parse_rating(self.rating)
    }
}

/// Whole-number rating in 1..=5; anything else stays `None`.
pub fn parse_rating(value: Option<f64>) -> Option<i32> {
    let rating = value?;
    if rating.fract() == 0.0 && (1.0..=5.0).contains(&rating) {
        Some(rating as i32)
    } else {
        None
    }
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct UserListData {
    pub users: Vec<PublicUser>,
    pub pagination: PageInfo,
}
