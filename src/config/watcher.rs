// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! File watcher for hot-reloading the cue sheet.
//!
//! Edits are debounced, then the sheet is re-read and validated. A sheet
//! that fails to parse is reported and the previous one stays in use.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::CueSheet;

/// Events emitted by the cue sheet watcher
#[derive(Debug, Clone)]
pub enum ConfigEvent {
    /// Cue sheet was modified and successfully reloaded
    Reloaded(Box<CueSheet>),
    /// Cue sheet was modified but failed to parse
    Error(String),
}

/// Cue sheet watcher with debouncing and validation
pub struct CueSheetWatcher {
    _watcher: RecommendedWatcher,
    event_receiver: Receiver<ConfigEvent>,
    watched_path: PathBuf,
}

impl CueSheetWatcher {
    /// Create a new watcher for the cue sheet at `path`
    ///
    /// The sheet's directory is watched so editors that replace the file
    /// on save are still seen.
    ///
    /// # Arguments
    /// * `path` - Cue sheet to watch
    /// * `debounce_ms` - Debounce duration in milliseconds (default: 500)
    pub fn new<P: AsRef<Path>>(path: P, debounce_ms: Option<u64>) -> Result<Self> {
        let watched_path = path.as_ref().to_path_buf();
        let debounce_duration = Duration::from_millis(debounce_ms.unwrap_or(500));

        let file_name = watched_path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| anyhow!("Cue sheet path has no file name: {:?}", watched_path))?;
        let directory = match watched_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (event_tx, event_rx): (Sender<ConfigEvent>, Receiver<ConfigEvent>) = mpsc::channel();
        let (notify_tx, notify_rx): (Sender<Event>, Receiver<Event>) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default(),
        )
        .map_err(|e| anyhow!("Failed to create file watcher: {}", e))?;

        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .map_err(|e| anyhow!("Failed to watch path {:?}: {}", directory, e))?;

        let sheet_path = watched_path.clone();

        // Debounce thread
        std::thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;

            loop {
                match notify_rx.recv_timeout(Duration::from_millis(100)) {
                    Ok(event) => {
                        let touches_sheet = event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == Some(file_name.as_os_str()));
                        let is_write =
                            matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));
                        if touches_sheet && is_write {
                            last_event_time = Some(Instant::now());
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        if let Some(last_time) = last_event_time {
                            if last_time.elapsed() >= debounce_duration {
                                let event = match CueSheet::load(&sheet_path) {
                                    Ok(sheet) => ConfigEvent::Reloaded(Box::new(sheet)),
                                    Err(e) => ConfigEvent::Error(format!(
                                        "Failed to load {:?}: {:#}",
                                        sheet_path, e
                                    )),
                                };
                                if event_tx.send(event).is_err() {
                                    // Receiver dropped
                                    break;
                                }
                                last_event_time = None;
                            }
                        }
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => {
                        // Watcher was dropped, exit thread
                        break;
                    }
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            event_receiver: event_rx,
            watched_path,
        })
    }

    /// Try to receive the next event (non-blocking)
    pub fn try_recv(&self) -> Option<ConfigEvent> {
        self.event_receiver.try_recv().ok()
    }

    /// Receive all pending events
    pub fn recv_all(&self) -> Vec<ConfigEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_recv() {
            events.push(event);
        }
        events
    }

    /// Block until the next event is received
    pub fn recv(&self) -> Option<ConfigEvent> {
        self.event_receiver.recv().ok()
    }

    /// Get the path being watched
    pub fn watched_path(&self) -> &Path {
        &self.watched_path
    }
}

/// Validate a cue sheet without applying it
pub fn validate_cue_sheet<P: AsRef<Path>>(path: P) -> Result<CueSheet> {
    CueSheet::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    const SHEET: &str = r#"
tempo: 120
cues:
  - { id: 0, name: "A <start>", time: 0 }
  - { id: 1, name: "A <end>", time: 16 }
"#;

    #[test]
    fn test_validate_cue_sheet() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("show.yaml");
        fs::write(&file_path, SHEET).unwrap();

        let sheet = validate_cue_sheet(&file_path).unwrap();
        assert_eq!(sheet.tempo, 120.0);
        assert_eq!(sheet.cues.len(), 2);
    }

    #[test]
    fn test_validate_invalid_cue_sheet() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.yaml");
        fs::write(&file_path, "this is not valid yaml: [").unwrap();

        assert!(validate_cue_sheet(&file_path).is_err());
    }

    #[test]
    fn test_watcher_creation() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("show.yaml");
        fs::write(&file_path, SHEET).unwrap();

        let watcher = CueSheetWatcher::new(&file_path, Some(100)).unwrap();
        assert_eq!(watcher.watched_path(), file_path.as_path());
        assert!(watcher.recv_all().is_empty());
    }

    #[test]
    fn test_watcher_detects_changes() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("show.yaml");
        fs::write(&file_path, SHEET).unwrap();

        let watcher = CueSheetWatcher::new(&file_path, Some(100)).unwrap();
        std::thread::sleep(Duration::from_millis(50));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&file_path)
            .unwrap();
        file.write_all(b"tempo: 90\ncues: []\n").unwrap();
        file.flush().unwrap();
        drop(file);

        // Wait for debounce + processing
        std::thread::sleep(Duration::from_millis(400));

        let events = watcher.recv_all();
        if let Some(ConfigEvent::Reloaded(sheet)) =
            events.iter().find(|e| matches!(e, ConfigEvent::Reloaded(_)))
        {
            assert_eq!(sheet.tempo, 90.0);
            assert!(sheet.cues.is_empty());
        }
        // File events may be delayed on CI machines, so absence is not a failure
    }
}
