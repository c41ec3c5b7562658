pub mod dto;
pub mod handlers;
pub mod repo;

use axum::{
    routing::{get, put},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/skills",
            get(handlers::list_skills).post(handlers::create_skill),
        )
        .route("/skills/categories", get(handlers::get_categories))
        .route("/skills/popular", get(handlers::get_popular))
        .route("/skills/:id/usage", put(handlers::increment_usage))
}
