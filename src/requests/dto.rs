use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{RequestStatus, SwapRequestDetailsRow};
use crate::params::PageInfo;
use crate::users::dto::UserBrief;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestDirection {
    Sent,
    Received,
    #[default]
    All,
}

impl RequestDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestDirection::Sent => "sent",
            RequestDirection::Received => "received",
            RequestDirection::All => "all",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    #[serde(default = "crate::params::default_page")]
    pub page: i64,
    #[serde(default = "crate::params::default_limit")]
    pub limit: i64,
    #[serde(default, deserialize_with = "crate::params::empty_string_as_none")]
    pub status: Option<RequestStatus>,
    #[serde(rename = "type", default)]
    pub direction: RequestDirection,
}

// Body fields deserialize leniently: a malformed value must become a
// field-level validation error, not a rejected body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub to_user_id: Option<String>,
    #[serde(default)]
    pub skills_offered: Vec<String>,
    #[serde(default)]
    pub skills_wanted: Vec<String>,
    pub message: Option<String>,
}

impl CreateRequestBody {
    pub fn parsed_to_user(&self) -> Option<Uuid> {
        self.to_user_id
            .as_deref()
            .and_then(|raw| Uuid::parse_str(raw).ok())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusBody {
    pub status: Option<String>,
    pub response_message: Option<String>,
}

impl UpdateStatusBody {
    /// Only the two recipient decisions parse; anything else stays `None`.
    pub fn parsed_status(&self) -> Option<RequestStatus> {
        match self.status.as_deref() {
            Some("accepted") => Some(RequestStatus::Accepted),
            Some("rejected") => Some(RequestStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompleteBody {
    pub rating: Option<f64>,
    pub review: Option<String>,
}

impl CompleteBody {
    pub fn parsed_rating(&self) -> Option<i32> {
        crate::users::dto::parse_rating(self.rating)
    }
}

/// Swap request with both participants expanded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequestDetails {
    pub id: Uuid,
    pub from_user: UserBrief,
    pub to_user: UserBrief,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub message: String,
    pub status: RequestStatus,
    pub response_message: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub rating: Option<i32>,
    pub review: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<SwapRequestDetailsRow> for SwapRequestDetails {
    fn from(row: SwapRequestDetailsRow) -> Self {
        Self {
            id: row.id,
            from_user: UserBrief {
                id: row.from_user,
                name: row.from_name,
                avatar: row.from_avatar,
                rating: row.from_rating,
            },
            to_user: UserBrief {
                id: row.to_user,
                name: row.to_name,
                avatar: row.to_avatar,
                rating: row.to_rating,
            },
            skills_offered: row.skills_offered,
            skills_wanted: row.skills_wanted,
            message: row.message,
            status: row.status,
            response_message: row.response_message,
            completed_at: row.completed_at,
            rating: row.rating,
            review: row.review,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RequestData {
    pub request: SwapRequestDetails,
}

#[derive(Debug, Serialize)]
pub struct RequestListData {
    pub requests: Vec<SwapRequestDetails>,
    pub pagination: PageInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn list_query_defaults_to_all_directions() {
        let q: ListRequestsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.direction, RequestDirection::All);
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
        assert!(q.status.is_none());

        let q: ListRequestsQuery =
            serde_json::from_str(r#"{"type": "sent", "status": "pending"}"#).unwrap();
        assert_eq!(q.direction, RequestDirection::Sent);
        assert_eq!(q.status, Some(RequestStatus::Pending));
    }

    #[test]
    fn create_body_accepts_camel_case() {
        let body: CreateRequestBody = serde_json::from_str(
            r#"{
                "toUserId": "7f7a3b56-9a6d-4a9e-9a49-1c5dc9b7a111",
                "skillsOffered": ["Python"],
                "skillsWanted": ["Figma"],
                "message": "Trade?"
            }"#,
        )
        .unwrap();
        assert!(body.parsed_to_user().is_some());
        assert_eq!(body.skills_offered, vec!["Python"]);
        assert_eq!(body.message.as_deref(), Some("Trade?"));
    }

    #[test]
    fn malformed_to_user_id_still_deserializes() {
        // A non-UUID target must reach field validation, not fail the body.
        let body: CreateRequestBody =
            serde_json::from_str(r#"{"toUserId": "not-a-uuid"}"#).unwrap();
        assert_eq!(body.parsed_to_user(), None);
        let body: CreateRequestBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.parsed_to_user(), None);
    }

    #[test]
    fn unknown_status_string_still_deserializes() {
        let body: UpdateStatusBody = serde_json::from_str(r#"{"status": "banana"}"#).unwrap();
        assert_eq!(body.parsed_status(), None);
        // pending is not a recipient decision
        let body: UpdateStatusBody = serde_json::from_str(r#"{"status": "pending"}"#).unwrap();
        assert_eq!(body.parsed_status(), None);
        let body: UpdateStatusBody = serde_json::from_str(r#"{"status": "accepted"}"#).unwrap();
        assert_eq!(body.parsed_status(), Some(RequestStatus::Accepted));
        let body: UpdateStatusBody = serde_json::from_str(r#"{"status": "rejected"}"#).unwrap();
        assert_eq!(body.parsed_status(), Some(RequestStatus::Rejected));
    }

    #[test]
    fn fractional_rating_still_deserializes() {
        let body: CompleteBody = serde_json::from_str(r#"{"rating": 4.5}"#).unwrap();
        assert_eq!(body.parsed_rating(), None);
        let body: CompleteBody = serde_json::from_str(r#"{"rating": 6}"#).unwrap();
        assert_eq!(body.parsed_rating(), None);
        let body: CompleteBody = serde_json::from_str(r#"{"rating": 5}"#).unwrap();
        assert_eq!(body.parsed_rating(), Some(5));
    }

    #[test]
    fn details_round_trip_expands_participants() {
        let row = SwapRequestDetailsRow {
            id: Uuid::new_v4(),
            from_user: Uuid::new_v4(),
            to_user: Uuid::new_v4(),
            skills_offered: vec!["Python".into()],
            skills_wanted: vec!["Figma".into()],
            message: "Trade?".into(),
            status: RequestStatus::Pending,
            response_message: String::new(),
            completed_at: None,
            rating: None,
            review: None,
            created_at: datetime!(2024-03-01 8:30 UTC),
            updated_at: datetime!(2024-03-01 8:30 UTC),
            from_name: "Marc Demo".into(),
            from_avatar: String::new(),
            from_rating: 4.2,
            to_name: "Michell Chen".into(),
            to_avatar: String::new(),
            to_rating: 3.8,
        };
        let details = SwapRequestDetails::from(row);
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["fromUser"]["name"], "Marc Demo");
        assert_eq!(json["fromUser"]["rating"], 4.2);
        assert_eq!(json["toUser"]["name"], "Michell Chen");
        assert_eq!(json["skillsOffered"][0], "Python");
        assert_eq!(json["skillsWanted"][0], "Figma");
        assert_eq!(json["message"], "Trade?");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["completedAt"], serde_json::Value::Null);
    }
}
