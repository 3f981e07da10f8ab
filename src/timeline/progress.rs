// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song and section completion percentages.
//!
//! Values are not clamped: a time observed outside the span (transport
//! jitter, a retained lookup) yields a percentage below 0 or above 100.

use crate::arrangement::{CueId, Song};

/// Percentage of `[from, to]` covered at `time`, or 0 for an empty span
pub fn percent(time: f64, from: f64, to: f64) -> f64 {
    let span = to - from;
    if span <= 0.0 {
        return 0.0;
    }
    (time - from) / span * 100.0
}

/// Progress through the current song
pub fn song_progress(song: Option<&Song>, time: f64) -> f64 {
    match song {
        Some(song) => percent(time, song.start().time, song.end().time),
        None => 0.0,
    }
}

/// Progress through the current section, bounded by the next section or
/// the song end
pub fn section_progress(song: Option<&Song>, section: Option<&CueId>, time: f64) -> f64 {
    let (Some(song), Some(section)) = (song, section) else {
        return 0.0;
    };

    song.sections()
        .iter()
        .position(|s| &s.id == section)
        .and_then(|index| song.section_span(index))
        .map(|(from, to)| percent(time, from, to))
        .unwrap_or(0.0)
}
