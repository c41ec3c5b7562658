//! Body extraction that answers malformed JSON with the standard
//! validation envelope instead of axum's plain-text rejection.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, FieldError};

/// `Json<T>` that turns body deserialization failures into a 400
/// `{success: false, errors: [...]}` response.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::Validation(vec![FieldError::new(
                "body",
                rejection.body_text(),
            )])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        rating: i32,
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn valid_body_passes_through() {
        let ApiJson(payload) = ApiJson::<Payload>::from_request(json_request(r#"{"rating": 5}"#), &())
            .await
            .unwrap();
        assert_eq!(payload.rating, 5);
    }

    #[tokio::test]
    async fn type_mismatch_answers_validation_envelope() {
        let err = ApiJson::<Payload>::from_request(json_request(r#"{"rating": "five"}"#), &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn broken_json_answers_validation_envelope() {
        let err = ApiJson::<Payload>::from_request(json_request("{not json"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
