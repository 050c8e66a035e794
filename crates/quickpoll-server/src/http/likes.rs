//! `/polls/{poll_id}/likes` handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use metrics::counter;
use quickpoll_core::{LikeDelta, PollId};
use quickpoll_store::NewLike;
use serde::Serialize;

use super::error::ApiError;
use crate::metrics::POLL_MUTATIONS_TOTAL;
use crate::server::AppState;

/// Body of `GET /polls/{poll_id}/likes/{user_id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeStatus {
    /// Whether the user currently likes the poll.
    pub is_liked: bool,
}

/// POST /polls/{poll_id}/likes
pub async fn toggle_like(
    State(state): State<AppState>,
    path: Result<Path<PollId>, PathRejection>,
    body: Result<Json<NewLike>, JsonRejection>,
) -> Result<Json<LikeDelta>, ApiError> {
    let Path(poll_id) = path?;
    let Json(like) = body?;
    let delta = state.store.toggle_like(poll_id, &like.user_id).await?;
    counter!(POLL_MUTATIONS_TOTAL, "kind" => "like").increment(1);
    Ok(Json(delta))
}

/// GET /polls/{poll_id}/likes/{user_id}
pub async fn get_user_like(
    State(state): State<AppState>,
    path: Result<Path<(PollId, String)>, PathRejection>,
) -> Result<Json<LikeStatus>, ApiError> {
    let Path((poll_id, user_id)) = path?;
    let is_liked = state.store.get_user_like(poll_id, &user_id).await?;
    Ok(Json(LikeStatus { is_liked }))
}
