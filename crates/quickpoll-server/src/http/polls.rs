//! `/polls` handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use metrics::counter;
use quickpoll_core::{PollId, PollSnapshot};
use quickpoll_store::{ListParams, NewPoll};

use super::error::ApiError;
use crate::metrics::POLL_MUTATIONS_TOTAL;
use crate::server::AppState;

/// POST /polls
pub async fn create_poll(
    State(state): State<AppState>,
    body: Result<Json<NewPoll>, JsonRejection>,
) -> Result<(StatusCode, Json<PollSnapshot>), ApiError> {
    let Json(new) = body?;
    let snapshot = state.store.create_poll(new).await?;
    counter!(POLL_MUTATIONS_TOTAL, "kind" => "create_poll").increment(1);
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /polls
pub async fn list_polls(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<PollSnapshot>>, ApiError> {
    let Query(params) = params?;
    Ok(Json(state.store.list_polls(params).await?))
}

/// GET /polls/{poll_id}
pub async fn get_poll(
    State(state): State<AppState>,
    path: Result<Path<PollId>, PathRejection>,
) -> Result<Json<PollSnapshot>, ApiError> {
    let Path(poll_id) = path?;
    Ok(Json(state.store.get_poll(poll_id).await?))
}

/// DELETE /polls/{poll_id}
pub async fn delete_poll(
    State(state): State<AppState>,
    path: Result<Path<PollId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(poll_id) = path?;
    state.store.delete_poll(poll_id).await?;
    counter!(POLL_MUTATIONS_TOTAL, "kind" => "delete_poll").increment(1);
    Ok(StatusCode::NO_CONTENT)
}
