use axum::Json;
use serde::Serialize;

/// Success envelope shared by every endpoint: `{success, message?, data?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data: Some(data),
        })
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            data: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_envelope_omits_message() {
        let Json(body) = ApiResponse::data(serde_json::json!({"n": 1}));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("message").is_none());
        assert_eq!(json["data"]["n"], 1);
    }

    #[test]
    fn message_envelope_omits_data() {
        let Json(body) = ApiResponse::message("Logged out");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Logged out");
        assert!(json.get("data").is_none());
    }
}
