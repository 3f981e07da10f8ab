// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Songs and sections of a show.
//!
//! A song is the stretch of the arrangement between its start and end
//! markers; sections are the named points inside it.

use serde::{Deserialize, Serialize};

use super::cue::{CueId, CuePoint};

/// A song boundary marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Cue id of the marker
    pub id: CueId,
    /// Marker time in beats
    pub time: f64,
}

impl Boundary {
    /// Create a boundary
    pub fn new(id: impl Into<CueId>, time: f64) -> Self {
        Self { id: id.into(), time }
    }
}

impl From<&CuePoint> for Boundary {
    fn from(cue: &CuePoint) -> Self {
        Self {
            id: cue.id.clone(),
            time: cue.time,
        }
    }
}

/// A named point inside a song where a segment begins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Cue id of the marker
    pub id: CueId,
    /// Section name
    pub name: String,
    /// Start time in beats
    pub time: f64,
}

impl Section {
    /// Create a section
    pub fn new(id: impl Into<CueId>, name: impl Into<String>, time: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            time,
        }
    }
}

impl From<CuePoint> for Section {
    fn from(cue: CuePoint) -> Self {
        Self {
            id: cue.id,
            name: cue.name,
            time: cue.time,
        }
    }
}

/// A song in the show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    /// Song name
    name: String,
    /// Start marker
    start: Boundary,
    /// End marker
    end: Boundary,
    /// Stop the transport when this song ends
    stop_at_end: bool,
    /// Sections, ordered by time
    sections: Vec<Section>,
}

impl Song {
    /// Create a song with no sections
    pub fn new(name: impl Into<String>, start: Boundary, end: Boundary) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            stop_at_end: true,
            sections: Vec::new(),
        }
    }

    /// Get song name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Songs are identified by their start marker
    pub fn id(&self) -> &CueId {
        &self.start.id
    }

    /// Get start marker
    pub fn start(&self) -> &Boundary {
        &self.start
    }

    /// Get end marker
    pub fn end(&self) -> &Boundary {
        &self.end
    }

    /// Whether the transport stops when this song ends
    pub fn stop_at_end(&self) -> bool {
        self.stop_at_end
    }

    /// Set stop-at-end
    pub fn set_stop_at_end(&mut self, stop: bool) {
        self.stop_at_end = stop;
    }

    /// Get all sections
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of sections
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Length in beats (may be zero or negative for a malformed song)
    pub fn duration(&self) -> f64 {
        self.end.time - self.start.time
    }

    /// Whether `time` lies within `[start, end]`
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start.time && time <= self.end.time
    }

    /// Start and exclusive end of the section at `index`.
    ///
    /// The last section runs until the song's end marker.
    pub fn section_span(&self, index: usize) -> Option<(f64, f64)> {
        let section = self.sections.get(index)?;
        let upper = self
            .sections
            .get(index + 1)
            .map(|next| next.time)
            .unwrap_or(self.end.time);
        Some((section.time, upper))
    }

    /// Replace the section list
    pub(crate) fn set_sections(&mut self, sections: Vec<Section>) {
        self.sections = sections;
    }

    /// Builder: add section
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }
}
