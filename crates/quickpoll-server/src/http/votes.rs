//! `/polls/{poll_id}/votes` handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use metrics::counter;
use quickpoll_core::{PollId, VoteRecord};
use quickpoll_store::NewVote;

use super::error::ApiError;
use crate::metrics::POLL_MUTATIONS_TOTAL;
use crate::server::AppState;

/// POST /polls/{poll_id}/votes
pub async fn cast_vote(
    State(state): State<AppState>,
    path: Result<Path<PollId>, PathRejection>,
    body: Result<Json<NewVote>, JsonRejection>,
) -> Result<(StatusCode, Json<VoteRecord>), ApiError> {
    let Path(poll_id) = path?;
    let Json(vote) = body?;
    let record = state.store.cast_vote(poll_id, vote).await?;
    counter!(POLL_MUTATIONS_TOTAL, "kind" => "vote").increment(1);
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /polls/{poll_id}/votes/{user_id}
pub async fn get_user_vote(
    State(state): State<AppState>,
    path: Result<Path<(PollId, String)>, PathRejection>,
) -> Result<Json<VoteRecord>, ApiError> {
    let Path((poll_id, user_id)) = path?;
    match state.store.get_user_vote(poll_id, &user_id).await? {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::VoteNotFound { poll_id, user_id }),
    }
}
