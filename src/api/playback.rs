// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Playback routes.

use axum::{extract::State, Json};

use crate::engine::PlaybackState;
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /startPlaying
pub async fn start_playing(State(state): State<AppState>) -> ApiResult<&'static str> {
    state.start_playing().await?;
    Ok("Started playback")
}

/// GET /stopPlaying
pub async fn stop_playing(State(state): State<AppState>) -> ApiResult<&'static str> {
    state.stop_playing().await?;
    Ok("Stopped playback")
}

/// GET /state - Latest playback state
pub async fn get_state(State(state): State<AppState>) -> Json<PlaybackState> {
    Json(state.playback_state())
}
