//! Request parameter helpers shared by the handlers.

use serde::{Deserialize, Deserializer, Serialize};

pub fn default_page() -> i64 {
    1
}

pub fn default_limit() -> i64 {
    10
}

/// Clamp client-supplied paging values to something sane.
pub fn clamp_page(page: i64) -> i64 {
    page.max(1)
}

pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, 100)
}

pub fn offset(page: i64, limit: i64) -> i64 {
    (page - 1) * limit
}

/// Pagination block returned alongside list payloads.
#[derive(Debug, Serialize)]
pub struct PageInfo {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl PageInfo {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// Treats `?status=` the same as an absent parameter. Clients send empty
/// strings for cleared filters.
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => serde_json::from_value(serde_json::Value::String(s.to_string()))
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Substring filters: empty or whitespace-only means "no filter".
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Field limits count characters, not bytes, so multi-byte text near a
/// limit is not rejected early.
pub fn exceeds_chars(value: &str, max: usize) -> bool {
    value.chars().count() > max
}
