//! HTTP error responses.
//!
//! Every failed request answers with `{"detail": ..., "code": ...}`.
//! Internal failures keep their cause in the log and send a generic detail.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quickpoll_core::PollId;
use quickpoll_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub detail: String,
    /// Machine-readable code.
    pub code: &'static str,
}

/// Errors returned by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Poll store rejection or failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The user has not voted on the poll.
    #[error("no vote by user {user_id} on poll {poll_id}")]
    VoteNotFound {
        /// Poll queried.
        poll_id: PollId,
        /// User queried.
        user_id: String,
    },

    /// Malformed JSON body.
    #[error("invalid request body: {0}")]
    Body(#[from] JsonRejection),

    /// Malformed path parameter.
    #[error("invalid path: {0}")]
    Path(#[from] PathRejection),

    /// Malformed query string.
    #[error("invalid query: {0}")]
    Query(#[from] QueryRejection),
}

impl ApiError {
    /// Status code and machine code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Store(StoreError::PollNotFound(_)) => (StatusCode::NOT_FOUND, "POLL_NOT_FOUND"),
            Self::VoteNotFound { .. } => (StatusCode::NOT_FOUND, "VOTE_NOT_FOUND"),
            Self::Store(StoreError::DuplicateVote { .. }) => (StatusCode::BAD_REQUEST, "DUPLICATE_VOTE"),
            Self::Store(StoreError::OptionNotInPoll { .. }) => {
                (StatusCode::BAD_REQUEST, "OPTION_NOT_IN_POLL")
            }
            Self::Store(StoreError::Validation { .. })
            | Self::Body(_)
            | Self::Path(_)
            | Self::Query(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_owned()
        } else {
            tracing::debug!(error = %self, code, "request rejected");
            match &self {
                Self::Body(rejection) => rejection.body_text(),
                Self::Path(rejection) => rejection.body_text(),
                Self::Query(rejection) => rejection.body_text(),
                _ => self.to_string(),
            }
        };
        (status, Json(ErrorBody { detail, code })).into_response()
    }
}
