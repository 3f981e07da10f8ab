// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! HTTP and WebSocket routes.

pub mod cues;
pub mod health;
pub mod playback;
pub mod push;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Routes for the control API, push channel included at `/ws`
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/cues", get(cues::get_cues))
        .route("/jumpToCue", post(cues::jump_to_cue))
        .route("/reorderSongs", post(cues::reorder_songs))
        .route("/startPlaying", get(playback::start_playing))
        .route("/stopPlaying", get(playback::stop_playing))
        .route("/state", get(playback::get_state))
        .route("/health", get(health::health))
        .route("/ws", get(push::push_channel))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Push channel alone, served at `/` on its own port
pub fn create_push_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(push::push_channel))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
