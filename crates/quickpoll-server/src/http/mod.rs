//! REST surface over the poll store.

pub mod error;
pub mod likes;
pub mod polls;
pub mod votes;

use axum::Router;
use axum::routing::{get, post};

pub use error::{ApiError, ErrorBody};

use crate::server::AppState;

/// Poll, vote, and like routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/polls", post(polls::create_poll).get(polls::list_polls))
        .route("/polls/{poll_id}", get(polls::get_poll).delete(polls::delete_poll))
        .route("/polls/{poll_id}/votes", post(votes::cast_vote))
        .route("/polls/{poll_id}/votes/{user_id}", get(votes::get_user_vote))
        .route("/polls/{poll_id}/likes", post(likes::toggle_like))
        .route("/polls/{poll_id}/likes/{user_id}", get(likes::get_user_like))
}
