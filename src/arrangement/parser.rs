// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Cue parser.
//!
//! Turns the transport's flat marker list into songs. Markers named
//! `"<song> <start>"` and `"<song> <end>"` bound a song; every other marker
//! is a section of whichever song is still open when it is scanned.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::cue::CuePoint;
use super::song::{Boundary, Section, Song};
use crate::timeline::Timeline;

/// Marker naming conventions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserOptions {
    /// Suffix marking a song start
    #[serde(default = "default_start_suffix")]
    pub start_suffix: String,
    /// Suffix marking a song end
    #[serde(default = "default_end_suffix")]
    pub end_suffix: String,
    /// Name of the lead-in section inserted at each song start
    #[serde(default = "default_countdown_name")]
    pub countdown_name: String,
    /// Order songs by start time instead of marker discovery order
    #[serde(default)]
    pub sort_by_start: bool,
}

fn default_start_suffix() -> String {
    " <start>".to_string()
}
fn default_end_suffix() -> String {
    " <end>".to_string()
}
fn default_countdown_name() -> String {
    "Countdown".to_string()
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            start_suffix: default_start_suffix(),
            end_suffix: default_end_suffix(),
            countdown_name: default_countdown_name(),
            sort_by_start: false,
        }
    }
}

/// Recoverable problems found while parsing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseIssue {
    /// Section marker seen while no song was open
    #[error("section marker {name:?} at {time} is outside any open song")]
    OrphanSection { name: String, time: f64 },
    /// Song has an end marker but no start marker
    #[error("song {0:?} has no start marker")]
    MissingStart(String),
    /// Song has a start marker but no end marker
    #[error("song {0:?} has no end marker")]
    MissingEnd(String),
    /// Song ends at or before its start
    #[error("song {name:?} ends at {end} which is not after its start at {start}")]
    EmptySpan { name: String, start: f64, end: f64 },
}

/// Result of parsing a cue list
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// Valid songs in sequence order
    pub timeline: Timeline,
    /// Songs and markers that were dropped
    pub issues: Vec<ParseIssue>,
}

/// Song being assembled during the scan
struct Draft {
    name: String,
    start: Option<Boundary>,
    end: Option<Boundary>,
    sections: Vec<Section>,
}

/// Builds a timeline from raw cue markers
#[derive(Debug, Clone, Default)]
pub struct CueParser {
    options: ParserOptions,
}

impl CueParser {
    /// Create a parser with the given naming conventions
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Parse cues in the order given. Never fails; dropped input is
    /// reported through [`ParseOutcome::issues`].
    pub fn parse(&self, cues: &[CuePoint]) -> ParseOutcome {
        let mut drafts: Vec<Draft> = Vec::new();
        let mut issues = Vec::new();

        for cue in cues {
            if let Some(name) = cue.name.strip_suffix(self.options.start_suffix.as_str()) {
                let draft = open(&mut drafts, name);
                draft.start = Some(Boundary::from(cue));
                draft.sections.clear();
            } else if let Some(name) = cue.name.strip_suffix(self.options.end_suffix.as_str()) {
                open(&mut drafts, name).end = Some(Boundary::from(cue));
            } else {
                // Most recently opened song still waiting for its end marker
                match drafts.iter_mut().rev().find(|d| d.end.is_none()) {
                    Some(draft) => draft.sections.push(Section::from(cue.clone())),
                    None => issues.push(ParseIssue::OrphanSection {
                        name: cue.name.clone(),
                        time: cue.time,
                    }),
                }
            }
        }

        let mut songs = Vec::with_capacity(drafts.len());
        for draft in drafts {
            if let Some(song) = self.finish(draft, &mut issues) {
                songs.push(song);
            }
        }

        if self.options.sort_by_start {
            songs.sort_by(|a, b| a.start().time.total_cmp(&b.start().time));
        }

        ParseOutcome {
            timeline: Timeline::new(songs),
            issues,
        }
    }

    fn finish(&self, draft: Draft, issues: &mut Vec<ParseIssue>) -> Option<Song> {
        let Draft {
            name,
            start,
            end,
            mut sections,
        } = draft;

        let (start, end) = match (start, end) {
            (Some(start), Some(end)) => (start, end),
            (None, _) => {
                issues.push(ParseIssue::MissingStart(name));
                return None;
            }
            (_, None) => {
                issues.push(ParseIssue::MissingEnd(name));
                return None;
            }
        };

        if start.time >= end.time {
            issues.push(ParseIssue::EmptySpan {
                name,
                start: start.time,
                end: end.time,
            });
            return None;
        }

        sections.sort_by(|a, b| a.time.total_cmp(&b.time));
        if !sections.is_empty() {
            let countdown = Section::new(
                start.id.clone(),
                self.options.countdown_name.clone(),
                start.time,
            );
            sections.insert(0, countdown);
        }

        let mut song = Song::new(name, start, end);
        song.set_sections(sections);
        Some(song)
    }
}

/// Find the draft for `name`, opening a new one if needed
fn open<'a>(drafts: &'a mut Vec<Draft>, name: &str) -> &'a mut Draft {
    let index = match drafts.iter().position(|d| d.name == name) {
        Some(index) => index,
        None => {
            drafts.push(Draft {
                name: name.to_string(),
                start: None,
                end: None,
                sections: Vec::new(),
            });
            drafts.len() - 1
        }
    };
    &mut drafts[index]
}

/// Parse with default naming conventions
pub fn parse_cues(cues: &[CuePoint]) -> ParseOutcome {
    CueParser::default().parse(cues)
}
