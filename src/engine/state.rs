// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Live playback state.

use serde::{Deserialize, Serialize};

use crate::arrangement::CueId;

/// Transport and timeline position as last seen by the tick handler.
///
/// Written only by the engine; everyone else reads published copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Transport is playing
    pub is_playing: bool,
    /// Tempo in BPM, -1 until reported
    pub tempo: f64,
    /// Song position in whole beats, -1 until reported
    pub current_time: f64,
    /// Start cue id of the current song
    pub current_song_id: Option<CueId>,
    /// Cue id of the current section
    pub current_section_id: Option<CueId>,
    /// Progress through the current song
    pub song_progress_percent: f64,
    /// Progress through the current section
    pub section_progress_percent: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            tempo: -1.0,
            current_time: -1.0,
            current_song_id: None,
            current_section_id: None,
            song_progress_percent: 0.0,
            section_progress_percent: 0.0,
        }
    }
}
