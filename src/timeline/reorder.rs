// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Song order changes.

use std::collections::HashSet;
use std::sync::Arc;

use super::{SharedTimeline, Timeline};
use crate::arrangement::CueId;
use crate::error::ReorderError;

/// Applies a caller-supplied song order to the shared timeline
#[derive(Debug, Clone)]
pub struct ReorderManager {
    timeline: SharedTimeline,
}

impl ReorderManager {
    /// Create a manager for `timeline`
    pub fn new(timeline: SharedTimeline) -> Self {
        Self { timeline }
    }

    /// Reorder songs to match `order`, a list of song start ids.
    ///
    /// The order must name every current song exactly once. On any mismatch
    /// the timeline is left untouched.
    pub fn apply(&self, order: &[CueId]) -> Result<Arc<Timeline>, ReorderError> {
        let current = self.timeline.load();
        let reordered = reorder(&current, order)?;

        let installed = self
            .timeline
            .replace_if_current(&current, reordered)
            .ok_or(ReorderError::Stale)?;

        tracing::info!("Reordered {} songs", order.len());
        Ok(installed)
    }
}

/// Build a new timeline with songs in `order`
pub fn reorder(timeline: &Timeline, order: &[CueId]) -> Result<Timeline, ReorderError> {
    if order.is_empty() {
        return Err(ReorderError::Empty);
    }
    if order.len() != timeline.len() {
        return Err(ReorderError::LengthMismatch {
            expected: timeline.len(),
            actual: order.len(),
        });
    }

    let mut seen = HashSet::with_capacity(order.len());
    let mut songs = Vec::with_capacity(order.len());
    for id in order {
        if !seen.insert(id) {
            return Err(ReorderError::DuplicateSong(id.clone()));
        }
        let song = timeline
            .find(id)
            .ok_or_else(|| ReorderError::UnknownSong(id.clone()))?;
        songs.push(song.clone());
    }

    Ok(Timeline::new(songs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::{Boundary, Song};

    fn timeline() -> Timeline {
        Timeline::new(vec![
            Song::new("A", Boundary::new(1, 0.0), Boundary::new(2, 10.0)),
            Song::new("B", Boundary::new(3, 10.0), Boundary::new(4, 20.0)),
            Song::new("C", Boundary::new(5, 20.0), Boundary::new(6, 30.0)),
        ])
    }

    fn ids(values: &[u64]) -> Vec<CueId> {
        values.iter().map(|&v| CueId::from(v)).collect()
    }

    #[test]
    fn test_apply_permutation() {
        let shared = SharedTimeline::new(timeline());
        let manager = ReorderManager::new(shared.clone());

        let result = manager.apply(&ids(&[5, 1, 3])).unwrap();
        let names: Vec<&str> = result.songs().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
        assert_eq!(shared.load().ids(), ids(&[5, 1, 3]));
    }

    #[test]
    fn test_missing_id_rejected() {
        let shared = SharedTimeline::new(timeline());
        let manager = ReorderManager::new(shared.clone());

        let err = manager.apply(&ids(&[5, 1])).unwrap_err();
        assert_eq!(err, ReorderError::LengthMismatch { expected: 3, actual: 2 });
        assert_eq!(*shared.load(), timeline());
    }

    #[test]
    fn test_unknown_and_duplicate_rejected() {
        let shared = SharedTimeline::new(timeline());
        let manager = ReorderManager::new(shared.clone());

        assert_eq!(
            manager.apply(&ids(&[1, 3, 9])).unwrap_err(),
            ReorderError::UnknownSong(CueId::from(9))
        );
        assert_eq!(
            manager.apply(&ids(&[1, 3, 1])).unwrap_err(),
            ReorderError::DuplicateSong(CueId::from(1))
        );
        assert_eq!(manager.apply(&[]).unwrap_err(), ReorderError::Empty);
        assert_eq!(*shared.load(), timeline());
    }

    #[test]
    fn test_snapshot_readers_see_whole_order() {
        let shared = SharedTimeline::new(timeline());
        let manager = ReorderManager::new(shared.clone());

        let before = shared.load();
        manager.apply(&ids(&[3, 5, 1])).unwrap();

        assert_eq!(before.ids(), ids(&[1, 3, 5]));
        assert_eq!(shared.load().ids(), ids(&[3, 5, 1]));
    }
}
