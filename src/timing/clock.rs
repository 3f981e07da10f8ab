// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport clock.
//!
//! Tracks the song position in beats, advancing with wall-clock time at the
//! current tempo while running.

use std::time::Instant;

/// Slowest tempo accepted
pub const MIN_BPM: f64 = 20.0;
/// Fastest tempo accepted
pub const MAX_BPM: f64 = 300.0;

/// Clock state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Running,
}

/// Song position clock
#[derive(Debug, Clone)]
pub struct TransportClock {
    /// Current tempo in BPM
    bpm: f64,
    /// Current clock state
    state: ClockState,
    /// Song position in beats
    position: f64,
    /// Last time the position was advanced
    last_tick: Option<Instant>,
}

impl TransportClock {
    /// Create a stopped clock at the start of the song
    pub fn new(bpm: f64) -> Self {
        Self {
            bpm: bpm.clamp(MIN_BPM, MAX_BPM),
            state: ClockState::Stopped,
            position: 0.0,
            last_tick: None,
        }
    }

    /// Get the current tempo in BPM
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Set the tempo, keeping the position reached so far
    pub fn set_bpm(&mut self, bpm: f64) {
        if self.state == ClockState::Running {
            self.tick_at(Instant::now());
        }
        self.bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    }

    /// Get the current clock state
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Whether the clock is running
    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Song position in beats as of the last tick
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Start from the current position
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Start from the current position, counting from `now`
    pub fn start_at(&mut self, now: Instant) {
        if self.state != ClockState::Running {
            self.state = ClockState::Running;
            self.last_tick = Some(now);
        }
    }

    /// Stop, keeping the position
    pub fn stop(&mut self) {
        if self.state == ClockState::Running {
            self.tick_at(Instant::now());
        }
        self.state = ClockState::Stopped;
        self.last_tick = None;
    }

    /// Move to `beats`, keeping the running state
    pub fn locate(&mut self, beats: f64) {
        self.position = beats.max(0.0);
        if self.state == ClockState::Running {
            self.last_tick = Some(Instant::now());
        }
    }

    /// Advance to now and return the position if running
    pub fn tick(&mut self) -> Option<f64> {
        self.tick_at(Instant::now())
    }

    /// Advance to `now` and return the position if running
    pub fn tick_at(&mut self, now: Instant) -> Option<f64> {
        if self.state != ClockState::Running {
            return None;
        }

        if let Some(last) = self.last_tick {
            let elapsed = now.saturating_duration_since(last).as_secs_f64();
            self.position += elapsed * self.bpm / 60.0;
        }
        self.last_tick = Some(now);
        Some(self.position)
    }
}

impl Default for TransportClock {
    fn default() -> Self {
        Self::new(120.0) // Default to 120 BPM
    }
}
