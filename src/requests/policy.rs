//! Guard conditions for the swap request lifecycle:
//! pending -> accepted | rejected, accepted -> completed.
//! Every check runs before any write; a failed guard leaves state unchanged.

use uuid::Uuid;

use super::repo::{RequestStatus, SwapRequestRow};
use crate::error::ApiError;

pub fn ensure_participant(request: &SwapRequestRow, caller: Uuid) -> Result<(), ApiError> {
    if request.from_user == caller || request.to_user == caller {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "You can only view requests you are involved in",
        ))
    }
}

pub fn ensure_recipient(request: &SwapRequestRow, caller: Uuid) -> Result<(), ApiError> {
    if request.to_user == caller {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "You can only respond to requests sent to you",
        ))
    }
}

pub fn ensure_pending(request: &SwapRequestRow) -> Result<(), ApiError> {
    if request.status == RequestStatus::Pending {
        Ok(())
    } else {
        Err(ApiError::conflict("Request has already been processed"))
    }
}

pub fn ensure_accepted(request: &SwapRequestRow) -> Result<(), ApiError> {
    if request.status == RequestStatus::Accepted {
        Ok(())
    } else {
        Err(ApiError::conflict("Only accepted requests can be completed"))
    }
}

/// The counterparty whose rating a completion updates.
pub fn other_participant(request: &SwapRequestRow, caller: Uuid) -> Uuid {
    if request.from_user == caller {
        request.to_user
    } else {
        request.from_user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use time::OffsetDateTime;

    fn request(status: RequestStatus) -> SwapRequestRow {
        SwapRequestRow {
            id: Uuid::new_v4(),
            from_user: Uuid::new_v4(),
            to_user: Uuid::new_v4(),
            skills_offered: vec!["Python".into()],
            skills_wanted: vec!["Figma".into()],
            message: String::new(),
            status,
            response_message: String::new(),
            completed_at: None,
            rating: None,
            review: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn only_recipient_may_respond() {
        let req = request(RequestStatus::Pending);
        assert!(ensure_recipient(&req, req.to_user).is_ok());

        let err = ensure_recipient(&req, req.from_user).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        let err = ensure_recipient(&req, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn respond_requires_pending() {
        assert!(ensure_pending(&request(RequestStatus::Pending)).is_ok());
        for status in [
            RequestStatus::Accepted,
            RequestStatus::Rejected,
            RequestStatus::Completed,
            RequestStatus::Cancelled,
        ] {
            let err = ensure_pending(&request(status)).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn complete_requires_accepted() {
        assert!(ensure_accepted(&request(RequestStatus::Accepted)).is_ok());
        for status in [
            RequestStatus::Pending,
            RequestStatus::Rejected,
            RequestStatus::Completed,
        ] {
            let err = ensure_accepted(&request(status)).unwrap_err();
            assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn participants_may_view_and_complete() {
        let req = request(RequestStatus::Accepted);
        assert!(ensure_participant(&req, req.from_user).is_ok());
        assert!(ensure_participant(&req, req.to_user).is_ok());
        let err = ensure_participant(&req, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn completion_rates_the_counterparty() {
        let req = request(RequestStatus::Accepted);
        assert_eq!(other_participant(&req, req.from_user), req.to_user);
        assert_eq!(other_participant(&req, req.to_user), req.from_user);
    }
}
