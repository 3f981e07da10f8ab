// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Simulated transport.
//!
//! Plays a cue sheet against a tempo-driven clock so a show can be
//! rehearsed without external software. Position updates are pushed to
//! listeners whenever [`SimTransport::poll`] runs, normally from the task
//! started by [`SimTransport::spawn_clock`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use super::{TickField, TickSink, Transport, TransportEvent};
use crate::arrangement::{CueId, CuePoint};
use crate::config::CueSheet;
use crate::error::TransportError;
use crate::timing::TransportClock;

struct SimState {
    clock: TransportClock,
    cues: Vec<CuePoint>,
    listeners: HashMap<TickField, Vec<TickSink>>,
}

impl SimState {
    fn emit(&mut self, event: TransportEvent) {
        if let Some(sinks) = self.listeners.get_mut(&event.field()) {
            // Closed listeners are dropped
            sinks.retain(|sink| sink.send(event).is_ok());
        }
    }
}

/// Transport that plays a cue sheet in process
pub struct SimTransport {
    state: Mutex<SimState>,
}

impl SimTransport {
    /// Create a stopped transport for `sheet`
    pub fn new(sheet: CueSheet) -> Self {
        Self {
            state: Mutex::new(SimState {
                clock: TransportClock::new(sheet.tempo),
                cues: sheet.cues,
                listeners: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace cues and tempo, keeping the play state and position
    pub fn load_sheet(&self, sheet: CueSheet) {
        let mut state = self.lock();
        state.cues = sheet.cues;
        if state.clock.bpm() != sheet.tempo {
            state.clock.set_bpm(sheet.tempo);
            let bpm = state.clock.bpm();
            state.emit(TransportEvent::Tempo(bpm));
        }
        tracing::info!("Cue sheet loaded: {} cues at {} BPM", state.cues.len(), state.clock.bpm());
    }

    /// Current tempo in BPM
    pub fn tempo(&self) -> f64 {
        self.lock().clock.bpm()
    }

    /// Whether the clock is running
    pub fn is_playing(&self) -> bool {
        self.lock().clock.is_running()
    }

    /// Song position in beats
    pub fn position(&self) -> f64 {
        self.lock().clock.position()
    }

    /// Move the playhead to `beats`
    pub fn locate(&self, beats: f64) {
        let mut state = self.lock();
        state.clock.locate(beats);
        let position = state.clock.position();
        state.emit(TransportEvent::SongTime(position));
    }

    /// Advance the clock and report the position if running
    pub fn poll(&self) {
        let mut state = self.lock();
        if let Some(position) = state.clock.tick() {
            state.emit(TransportEvent::SongTime(position));
        }
    }

    /// Poll the clock every `interval` on a background task
    pub fn spawn_clock(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                self.poll();
            }
        })
    }
}

#[async_trait]
impl Transport for SimTransport {
    async fn cues(&self) -> Result<Vec<CuePoint>, TransportError> {
        Ok(self.lock().cues.clone())
    }

    fn add_listener(&self, field: TickField, sink: TickSink) {
        let mut state = self.lock();
        // Report the current value straight away, like a property observer
        let current = match field {
            TickField::IsPlaying => TransportEvent::IsPlaying(state.clock.is_running()),
            TickField::Tempo => TransportEvent::Tempo(state.clock.bpm()),
            TickField::CurrentSongTime => TransportEvent::SongTime(state.clock.position()),
        };
        if sink.send(current).is_ok() {
            state.listeners.entry(field).or_default().push(sink);
        }
    }

    async fn start_playing(&self) -> Result<(), TransportError> {
        let mut state = self.lock();
        if !state.clock.is_running() {
            state.clock.start();
            state.emit(TransportEvent::IsPlaying(true));
        }
        Ok(())
    }

    async fn stop_playing(&self) -> Result<(), TransportError> {
        let mut state = self.lock();
        if state.clock.is_running() {
            state.clock.stop();
            state.emit(TransportEvent::IsPlaying(false));
        }
        Ok(())
    }

    async fn jump_to_cue(&self, id: &CueId) -> Result<(), TransportError> {
        let mut state = self.lock();
        let time = state
            .cues
            .iter()
            .find(|cue| &cue.id == id)
            .map(|cue| cue.time)
            .ok_or_else(|| TransportError::CueNotFound(id.clone()))?;

        state.clock.locate(time);
        state.emit(TransportEvent::SongTime(time));
        Ok(())
    }
}
