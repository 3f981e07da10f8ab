// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration system for setlist.
//!
//! Two files drive a show:
//! - `setlist.toml`: server, parser, engine and transport settings
//! - the cue sheet (YAML): tempo and cue markers for the simulated transport

pub mod watcher;

pub use watcher::{validate_cue_sheet, ConfigEvent, CueSheetWatcher};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::arrangement::{CuePoint, ParserOptions};
use crate::engine::{EndDetection, DEFAULT_CROSSING_WINDOW};

/// Root settings file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Settings {
    /// Listener settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Marker naming conventions
    #[serde(default)]
    pub parser: ParserOptions,
    /// Tick handling
    #[serde(default)]
    pub engine: EngineSettings,
    /// Simulated transport
    #[serde(default)]
    pub transport: TransportSettings,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read settings file: {:?}", path.as_ref()))?;
        Self::from_toml(&contents)
    }

    /// Parse settings from a TOML string
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse TOML settings")
    }
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    /// Address to bind
    #[serde(default = "default_host")]
    pub host: String,
    /// Port for the HTTP API (push channel also served at `/ws`)
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Dedicated push channel port, if any
    #[serde(default = "default_push_port")]
    pub push_port: Option<u16>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    3001
}
fn default_push_port() -> Option<u16> {
    Some(8080)
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            push_port: default_push_port(),
        }
    }
}

/// Tick handling settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineSettings {
    /// How a song end is detected
    #[serde(default)]
    pub end_detection: EndDetection,
    /// Largest tick step, in beats, that still counts as crossing an end
    #[serde(default = "default_crossing_window")]
    pub crossing_window: f64,
    /// Messages queued per observer before it is skipped
    #[serde(default = "default_observer_queue")]
    pub observer_queue: usize,
}

fn default_crossing_window() -> f64 {
    DEFAULT_CROSSING_WINDOW
}

fn default_observer_queue() -> usize {
    64
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            end_detection: EndDetection::default(),
            crossing_window: default_crossing_window(),
            observer_queue: default_observer_queue(),
        }
    }
}

/// Simulated transport settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportSettings {
    /// Cue sheet to load
    #[serde(default = "default_cue_sheet")]
    pub cue_sheet: PathBuf,
    /// Reload the cue sheet when it changes on disk
    #[serde(default = "default_watch")]
    pub watch: bool,
    /// Debounce for cue sheet reloads in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Clock update interval in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_cue_sheet() -> PathBuf {
    PathBuf::from("show.yaml")
}
fn default_watch() -> bool {
    true
}
fn default_debounce_ms() -> u64 {
    500
}
fn default_tick_ms() -> u64 {
    20
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            cue_sheet: default_cue_sheet(),
            watch: default_watch(),
            debounce_ms: default_debounce_ms(),
            tick_ms: default_tick_ms(),
        }
    }
}

/// Cue markers for the simulated transport
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CueSheet {
    /// Tempo in BPM
    #[serde(default = "default_tempo")]
    pub tempo: f64,
    /// Cue markers, in transport order
    #[serde(default)]
    pub cues: Vec<CuePoint>,
}

fn default_tempo() -> f64 {
    120.0
}

impl Default for CueSheet {
    fn default() -> Self {
        Self {
            tempo: default_tempo(),
            cues: Vec::new(),
        }
    }
}

impl CueSheet {
    /// Load a cue sheet from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read cue sheet: {:?}", path.as_ref()))?;
        Self::from_yaml(&contents)
    }

    /// Parse a cue sheet from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse cue sheet YAML")
    }

    /// Serialize to a YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize cue sheet to YAML")
    }

    /// Save the cue sheet to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = self.to_yaml()?;
        fs::write(path.as_ref(), yaml)
            .with_context(|| format!("Failed to write cue sheet: {:?}", path.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings() {
        let text = r#"
[server]
host = "127.0.0.1"
http_port = 4000

[parser]
countdown_name = "Count-in"
sort_by_start = true

[engine]
end_detection = "crossing"
crossing_window = 1.5
observer_queue = 8

[transport]
cue_sheet = "shows/friday.yaml"
watch = false
"#;

        let settings = Settings::from_toml(text).unwrap();
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.http_port, 4000);
        assert_eq!(settings.server.push_port, Some(8080));
        assert_eq!(settings.parser.countdown_name, "Count-in");
        assert_eq!(settings.parser.start_suffix, " <start>");
        assert!(settings.parser.sort_by_start);
        assert_eq!(settings.engine.end_detection, EndDetection::Crossing);
        assert_eq!(settings.engine.crossing_window, 1.5);
        assert_eq!(settings.engine.observer_queue, 8);
        assert_eq!(settings.transport.cue_sheet, PathBuf::from("shows/friday.yaml"));
        assert!(!settings.transport.watch);
        assert_eq!(settings.transport.tick_ms, 20);
    }

    #[test]
    fn test_default_values() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.server.http_port, 3001);
        assert_eq!(settings.engine.end_detection, EndDetection::Exact);
        assert_eq!(settings.engine.crossing_window, 2.0);
        assert_eq!(settings.parser.end_suffix, " <end>");
    }

    #[test]
    fn test_parse_cue_sheet() {
        let yaml = r#"
tempo: 96
cues:
  - { id: 0, name: "A <start>", time: 0 }
  - { id: 1, name: "Verse", time: 10 }
  - { id: 2, name: "A <end>", time: 30 }
"#;

        let sheet = CueSheet::from_yaml(yaml).unwrap();
        assert_eq!(sheet.tempo, 96.0);
        assert_eq!(sheet.cues.len(), 3);
        assert_eq!(sheet.cues[1].name, "Verse");
        assert_eq!(sheet.cues[2].time, 30.0);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(Settings::from_toml("[server]\nhttp_port = \"lots\"").is_err());
        assert!(CueSheet::from_yaml("cues: 12").is_err());
    }

    #[test]
    fn test_cue_sheet_save_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("show.yaml");

        let sheet = CueSheet {
            tempo: 140.0,
            cues: vec![
                CuePoint::new(1, "Opener <start>", 0.0),
                CuePoint::new(2, "Opener <end>", 64.0),
            ],
        };
        sheet.save(&path).unwrap();

        let loaded = CueSheet::load(&path).unwrap();
        assert_eq!(loaded, sheet);
    }
}
