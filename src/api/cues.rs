// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timeline routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::arrangement::{CueId, Song};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JumpRequest {
    pub id: CueId,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<CueId>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /cues - Re-read cues and return the song list
pub async fn get_cues(State(state): State<AppState>) -> ApiResult<Json<Vec<Song>>> {
    let timeline = state.refresh_timeline().await?;
    Ok(Json(timeline.songs().to_vec()))
}

/// POST /jumpToCue - Move the playhead to a cue
pub async fn jump_to_cue(
    State(state): State<AppState>,
    request: Result<Json<JumpRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(request) = request.map_err(bad_body)?;
    state.jump_to_cue(&request.id).await
}

/// POST /reorderSongs - Replace the song order
pub async fn reorder_songs(
    State(state): State<AppState>,
    request: Result<Json<ReorderRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(request) = request.map_err(bad_body)?;
    state.reorder_songs(&request.order)?;
    Ok(Json(MessageResponse {
        message: "Songs reordered successfully".to_string(),
    }))
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}
