use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{SkillCategory, SkillRow};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub category: SkillCategory,
    pub description: String,
    pub is_active: bool,
    pub usage_count: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<SkillRow> for Skill {
    fn from(row: SkillRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            is_active: row.is_active,
            usage_count: row.usage_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn default_list_limit() -> i64 {
    50
}

fn default_popular_limit() -> i64 {
    10
}

#[derive(Debug, Deserialize)]
pub struct SkillListQuery {
    #[serde(default, deserialize_with = "crate::params::empty_string_as_none")]
    pub category: Option<SkillCategory>,
    pub search: Option<String>,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    #[serde(default = "default_popular_limit")]
    pub limit: i64,
}

// Category deserializes leniently so an unknown value becomes a field
// error, not a rejected body.
#[derive(Debug, Deserialize)]
pub struct CreateSkillBody {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl CreateSkillBody {
    pub fn parsed_category(&self) -> Option<SkillCategory> {
        let raw = self.category.as_deref()?;
        serde_json::from_value(serde_json::Value::String(raw.to_string())).ok()
    }
}

#[derive(Debug, Serialize)]
pub struct SkillData {
    pub skill: Skill,
}

#[derive(Debug, Serialize)]
pub struct SkillListData {
    pub skills: Vec<Skill>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesData {
    pub categories: Vec<SkillCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_defaults() {
        let q: SkillListQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.limit, 50);
        assert!(q.category.is_none());
        let q: PopularQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.limit, 10);
    }

    #[test]
    fn unknown_category_still_deserializes() {
        let body: CreateSkillBody =
            serde_json::from_str(r#"{"name": "React", "category": "cooking"}"#).unwrap();
        assert_eq!(body.parsed_category(), None);
        let body: CreateSkillBody =
            serde_json::from_str(r#"{"name": "React", "category": "programming"}"#).unwrap();
        assert_eq!(body.parsed_category(), Some(SkillCategory::Programming));
        let body: CreateSkillBody = serde_json::from_str(r#"{"name": "React"}"#).unwrap();
        assert_eq!(body.parsed_category(), None);
    }

    #[test]
    fn empty_category_filter_is_absent() {
        let q: SkillListQuery = serde_json::from_str(r#"{"category": ""}"#).unwrap();
        assert!(q.category.is_none());
        let q: SkillListQuery = serde_json::from_str(r#"{"category": "design"}"#).unwrap();
        assert_eq!(q.category, Some(SkillCategory::Design));
    }
}
