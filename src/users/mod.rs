pub mod dto;
pub mod handlers;
pub mod repo;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users/name/:name", get(handlers::get_user_by_name))
        .route("/users/:id", get(handlers::get_user))
        .route("/users/:id/rate", post(handlers::rate_user))
}
