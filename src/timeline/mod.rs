// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! The song timeline and everything that reads it.
//!
//! This module provides:
//! - Timeline: the ordered song sequence for the current show
//! - SharedTimeline: an atomically swappable handle to it
//! - Index: time to song/section resolution
//! - Progress: completion percentages
//! - Reorder: validated permutation of the song order

pub mod index;
pub mod progress;
pub mod reorder;

pub use index::{locate, resolve_section, resolve_song, Lookup, Position, Resolution};
pub use progress::{percent, section_progress, song_progress};
pub use reorder::ReorderManager;

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::arrangement::{CueId, Song};

/// Songs in performance order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    songs: Vec<Song>,
}

impl Timeline {
    /// Create a timeline from songs in performance order
    pub fn new(songs: Vec<Song>) -> Self {
        Self { songs }
    }

    /// Get all songs
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Number of songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Whether the timeline has no songs
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Get song at index
    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    /// Index of the song with the given id
    pub fn position(&self, id: &CueId) -> Option<usize> {
        self.songs.iter().position(|song| song.id() == id)
    }

    /// Song with the given id
    pub fn find(&self, id: &CueId) -> Option<&Song> {
        self.songs.iter().find(|song| song.id() == id)
    }

    /// Song ids in order
    pub fn ids(&self) -> Vec<CueId> {
        self.songs.iter().map(|song| song.id().clone()).collect()
    }
}

/// Shared handle to the current timeline.
///
/// Readers take a snapshot with [`SharedTimeline::load`] and keep using it
/// for the whole operation; writers replace the timeline in one pointer
/// swap, so a reader sees either the old or the new timeline in full.
#[derive(Debug, Clone)]
pub struct SharedTimeline {
    inner: Arc<ArcSwap<Timeline>>,
}

impl SharedTimeline {
    /// Create a handle holding `timeline`
    pub fn new(timeline: Timeline) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(timeline)),
        }
    }

    /// Snapshot of the current timeline
    pub fn load(&self) -> Arc<Timeline> {
        self.inner.load_full()
    }

    /// Install `timeline`, returning the snapshot now being served
    pub fn replace(&self, timeline: Timeline) -> Arc<Timeline> {
        let timeline = Arc::new(timeline);
        self.inner.store(Arc::clone(&timeline));
        timeline
    }

    /// Replace the timeline only if it is still `current`.
    ///
    /// Returns the installed snapshot, or `None` when another writer swapped
    /// in between.
    pub fn replace_if_current(
        &self,
        current: &Arc<Timeline>,
        timeline: Timeline,
    ) -> Option<Arc<Timeline>> {
        let timeline = Arc::new(timeline);
        let previous = self.inner.compare_and_swap(current, Arc::clone(&timeline));
        Arc::ptr_eq(&*previous, current).then_some(timeline)
    }
}

impl Default for SharedTimeline {
    fn default() -> Self {
        Self::new(Timeline::default())
    }
}
