// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Show arrangement.
//!
//! This module provides:
//! - Cues: raw markers reported by the transport
//! - Songs: start/end bounded spans with named sections
//! - Parser: marker list to song sequence

pub mod cue;
pub mod parser;
pub mod song;

pub use cue::{CueId, CuePoint};
pub use parser::{parse_cues, CueParser, ParseIssue, ParseOutcome, ParserOptions};
pub use song::{Boundary, Section, Song};
