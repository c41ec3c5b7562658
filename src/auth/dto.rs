use serde::{Deserialize, Serialize};

use crate::users::dto::PublicUser;
use crate::users::repo::Availability;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub skills_offered: Vec<String>,
    #[serde(default)]
    pub skills_wanted: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub availability: Option<Availability>,
    pub skills_offered: Option<Vec<String>>,
    pub skills_wanted: Option<Vec<String>>,
    pub avatar: Option<String>,
}

/// Token pair plus the public user, returned by register/login/refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthData {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_accepts_optional_skill_lists() {
        let body: RegisterRequest = serde_json::from_str(
            r#"{"name": "Joe Wills", "email": "joe@example.com", "password": "password123"}"#,
        )
        .unwrap();
        assert_eq!(body.name.as_deref(), Some("Joe Wills"));
        assert!(body.skills_offered.is_empty());

        let body: RegisterRequest = serde_json::from_str(
            r#"{"name": "Joe", "email": "j@e.com", "password": "password123",
                "skillsOffered": ["Python"], "skillsWanted": ["Figma"]}"#,
        )
        .unwrap();
        assert_eq!(body.skills_offered, vec!["Python"]);
        assert_eq!(body.skills_wanted, vec!["Figma"]);
    }

    #[test]
    fn profile_update_fields_all_optional() {
        let body: UpdateProfileRequest = serde_json::from_str("{}").unwrap();
        assert!(body.name.is_none());
        assert!(body.availability.is_none());

        let body: UpdateProfileRequest =
            serde_json::from_str(r#"{"availability": "anytime", "bio": "hi"}"#).unwrap();
        assert_eq!(body.availability, Some(Availability::Anytime));
        assert_eq!(body.bio.as_deref(), Some("hi"));
    }
}
