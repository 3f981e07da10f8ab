// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types.
//!
//! None of these are fatal to the process. Transport and reorder errors are
//! returned to whoever asked; the API layer turns them into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::arrangement::CueId;

/// A transport command failed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// No cue with this id exists
    #[error("Cue with ID {0} not found")]
    CueNotFound(CueId),

    /// The transport refused the command
    #[error("transport rejected command: {0}")]
    Rejected(String),
}

/// A reorder request did not describe a permutation of the current songs
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReorderError {
    #[error("Invalid order array provided")]
    Empty,

    #[error("Order array does not match all songs: expected {expected} ids, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Order array names unknown song {0}")]
    UnknownSong(CueId),

    #[error("Order array names song {0} more than once")]
    DuplicateSong(CueId),

    #[error("Timeline changed while reordering")]
    Stale,
}

/// Errors returned by the HTTP API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No songs found")]
    NoSongs,

    #[error("Playback already running")]
    AlreadyPlaying,

    #[error("Playback already stopped")]
    AlreadyStopped,

    #[error(transparent)]
    Reorder(#[from] ReorderError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            // Plain-text responses, as existing clients expect
            ApiError::NoSongs => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            ApiError::AlreadyPlaying | ApiError::AlreadyStopped => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            ApiError::Reorder(ref e) => error_body(StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::BadRequest(ref msg) => error_body(StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Transport(TransportError::CueNotFound(ref id)) => {
                tracing::error!("Cue with ID {} not found", id);
                error_body(StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::Transport(ref e) => {
                tracing::error!("Transport error: {}", e);
                error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
