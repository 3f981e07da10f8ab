// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Time to song/section resolution.
//!
//! A lookup that finds nothing keeps the previously resolved id; the
//! [`Resolution`] says whether the id came from this lookup or was retained.

use super::Timeline;
use crate::arrangement::{CueId, Song};

/// Outcome of a single lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The time fell inside the item at this index
    Resolved(usize),
    /// Nothing matched; the previous id was retained
    Unresolved,
}

impl Resolution {
    /// Whether the lookup found a match
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }
}

/// Result of resolving a song or a section
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    /// Whether this lookup matched
    pub resolution: Resolution,
    /// Current id, either resolved now or retained from before
    pub current: Option<CueId>,
    /// Index following the current item. Only meaningful when resolved.
    pub next_index: usize,
}

impl Lookup {
    fn resolved(index: usize, id: CueId) -> Self {
        Self {
            resolution: Resolution::Resolved(index),
            current: Some(id),
            next_index: index + 1,
        }
    }

    fn retained(previous: Option<&CueId>, index_of: impl Fn(&CueId) -> Option<usize>) -> Self {
        let next_index = previous.and_then(&index_of).map(|i| i + 1).unwrap_or(0);
        Self {
            resolution: Resolution::Unresolved,
            current: previous.cloned(),
            next_index,
        }
    }

    /// Whether this lookup matched
    pub fn is_resolved(&self) -> bool {
        self.resolution.is_resolved()
    }
}

/// Song and section lookups for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Song lookup
    pub song: Lookup,
    /// Section lookup within the current song
    pub section: Lookup,
}

/// Index of the first song whose `[start, end]` contains `time`
pub fn find_song(timeline: &Timeline, time: f64) -> Option<usize> {
    timeline.songs().iter().position(|song| song.contains(time))
}

/// Index of the section with `time <= t < upper`, where `upper` is the next
/// section's time or the song end
pub fn find_section(song: &Song, time: f64) -> Option<usize> {
    (0..song.section_count()).find(|&i| match song.section_span(i) {
        Some((from, to)) => time >= from && time < to,
        None => false,
    })
}

/// Resolve the current song, keeping `previous` on a miss
pub fn resolve_song(timeline: &Timeline, time: f64, previous: Option<&CueId>) -> Lookup {
    match find_song(timeline, time) {
        Some(index) => Lookup::resolved(index, timeline.songs()[index].id().clone()),
        None => Lookup::retained(previous, |id| timeline.position(id)),
    }
}

/// Resolve the current section of `song`, keeping `previous` on a miss
pub fn resolve_section(song: Option<&Song>, time: f64, previous: Option<&CueId>) -> Lookup {
    let Some(song) = song else {
        return Lookup::retained(previous, |_| None);
    };

    match find_section(song, time) {
        Some(index) => Lookup::resolved(index, song.sections()[index].id.clone()),
        None => Lookup::retained(previous, |id| {
            song.sections().iter().position(|section| &section.id == id)
        }),
    }
}

/// Resolve song and section for `time`.
///
/// The section is looked up in the current song, which is the retained one
/// when the song lookup misses.
pub fn locate(
    timeline: &Timeline,
    time: f64,
    previous_song: Option<&CueId>,
    previous_section: Option<&CueId>,
) -> Position {
    let song = resolve_song(timeline, time, previous_song);
    let current_song = song.current.as_ref().and_then(|id| timeline.find(id));
    let section = resolve_section(current_song, time, previous_section);
    Position { song, section }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::{parse_cues, Boundary, CuePoint};

    fn show() -> Timeline {
        parse_cues(&[
            CuePoint::new(0, "A <start>", 0.0),
            CuePoint::new(1, "Verse", 10.0),
            CuePoint::new(2, "A <end>", 30.0),
            CuePoint::new(3, "B <start>", 30.0),
            CuePoint::new(4, "B <end>", 60.0),
            CuePoint::new(5, "C <start>", 100.0),
            CuePoint::new(6, "Intro", 100.0),
            CuePoint::new(7, "Drop", 110.0),
            CuePoint::new(8, "C <end>", 120.0),
        ])
        .timeline
    }

    #[test]
    fn test_resolves_song_inside_interval() {
        let timeline = show();
        for t in [1.0, 15.0, 29.0] {
            let lookup = resolve_song(&timeline, t, None);
            assert_eq!(lookup.resolution, Resolution::Resolved(0));
            assert_eq!(lookup.current, Some(CueId::from(0)));
            assert_eq!(lookup.next_index, 1);
        }
        let lookup = resolve_song(&timeline, 45.0, None);
        assert_eq!(lookup.current, Some(CueId::from(3)));
        assert_eq!(lookup.next_index, 2);
    }

    #[test]
    fn test_shared_boundary_goes_to_first_song() {
        let timeline = show();
        let lookup = resolve_song(&timeline, 30.0, None);
        assert_eq!(lookup.current, Some(CueId::from(0)));
    }

    #[test]
    fn test_song_miss_is_sticky() {
        let timeline = show();
        let lookup = resolve_song(&timeline, 80.0, Some(&CueId::from(3)));
        assert_eq!(lookup.resolution, Resolution::Unresolved);
        assert_eq!(lookup.current, Some(CueId::from(3)));
        assert_eq!(lookup.next_index, 2);

        let cold = resolve_song(&timeline, 80.0, None);
        assert_eq!(cold.current, None);
        assert_eq!(cold.next_index, 0);
    }

    #[test]
    fn test_overlap_first_match_wins() {
        let timeline = Timeline::new(vec![
            Song::new("Long", Boundary::new(1, 0.0), Boundary::new(2, 50.0)),
            Song::new("Inner", Boundary::new(3, 10.0), Boundary::new(4, 20.0)),
        ]);
        let lookup = resolve_song(&timeline, 15.0, None);
        assert_eq!(lookup.current, Some(CueId::from(1)));
    }

    #[test]
    fn test_section_lookup() {
        let timeline = show();
        let a = timeline.get(0);

        let countdown = resolve_section(a, 5.0, None);
        assert_eq!(countdown.current, Some(CueId::from(0)));
        assert_eq!(countdown.next_index, 1);

        let verse = resolve_section(a, 10.0, None);
        assert_eq!(verse.resolution, Resolution::Resolved(1));
        assert_eq!(verse.current, Some(CueId::from(1)));
        assert_eq!(verse.next_index, 2);
    }

    #[test]
    fn test_section_end_is_exclusive() {
        let timeline = show();
        let a = timeline.get(0);
        let lookup = resolve_section(a, 30.0, Some(&CueId::from(1)));
        assert_eq!(lookup.resolution, Resolution::Unresolved);
        assert_eq!(lookup.current, Some(CueId::from(1)));
        assert_eq!(lookup.next_index, 2);
    }

    #[test]
    fn test_section_of_song_without_sections() {
        let timeline = show();
        let lookup = resolve_section(timeline.get(1), 40.0, None);
        assert_eq!(lookup.resolution, Resolution::Unresolved);
        assert_eq!(lookup.current, None);
    }

    #[test]
    fn test_locate_uses_retained_song() {
        let timeline = show();
        // 125 is past C; the retained song is still C so its sections apply
        let position = locate(&timeline, 125.0, Some(&CueId::from(5)), Some(&CueId::from(7)));
        assert!(!position.song.is_resolved());
        assert_eq!(position.song.current, Some(CueId::from(5)));
        assert!(!position.section.is_resolved());
        assert_eq!(position.section.current, Some(CueId::from(7)));
        assert_eq!(position.section.next_index, 3);

        let position = locate(&timeline, 112.0, None, None);
        assert!(position.song.is_resolved());
        assert_eq!(position.section.current, Some(CueId::from(7)));
    }
}
