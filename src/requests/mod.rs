pub mod dto;
pub mod handlers;
pub mod policy;
pub mod repo;

use axum::{
    routing::{get, put},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/requests",
            get(handlers::list_requests).post(handlers::create_request),
        )
        .route("/requests/:id", get(handlers::get_request))
        .route("/requests/:id/status", put(handlers::update_status))
        .route("/requests/:id/complete", put(handlers::complete_request))
}
