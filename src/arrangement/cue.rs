// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Cue markers as reported by the transport.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque cue identifier
///
/// Transports hand out ids in whatever form they like; cue sheets and
/// clients may send them as numbers or strings, so both deserialize into
/// the same textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CueId(String);

impl CueId {
    /// Create a cue id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CueId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CueId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for CueId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for CueId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(v) => CueId(v.to_string()),
            Raw::Float(v) => CueId(v.to_string()),
            Raw::Text(v) => CueId(v),
        })
    }
}

/// A named timestamp in the transport's arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuePoint {
    /// Transport-assigned identifier
    pub id: CueId,
    /// Marker name, possibly carrying a song boundary suffix
    pub name: String,
    /// Position in beats from the start of the arrangement
    pub time: f64,
}

impl CuePoint {
    /// Create a cue point
    pub fn new(id: impl Into<CueId>, name: impl Into<String>, time: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            time,
        }
    }
}
