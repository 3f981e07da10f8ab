// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Auto-advance at song ends.
//!
//! When the playhead reaches the end of the current song the controller
//! plans transport commands: stop if the song asks for it, then jump to the
//! next song's start, or stop for good after the last song.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::arrangement::{CueId, Song};
use crate::timeline::{Lookup, Resolution, Timeline};
use crate::transport::Transport;

/// How the end of a song is recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndDetection {
    /// A tick lands exactly on the end marker
    #[default]
    Exact,
    /// The previous tick was before the end marker and this one is at or past
    /// it, with no more than the crossing window between the two
    Crossing,
}

/// Largest step between ticks, in beats, still treated as continuous playback
pub const DEFAULT_CROSSING_WINDOW: f64 = 2.0;

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancePhase {
    /// Playing inside a song
    Running,
    /// Current song has ended; waiting for the position to move on
    Ended,
}

/// A transport command issued at a song end
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceCommand {
    Stop,
    Jump(CueId),
}

/// Commands to run for one song end
#[derive(Debug, Clone, PartialEq)]
pub struct AdvancePlan {
    /// Song that ended
    pub song: CueId,
    /// Commands in order
    pub commands: Vec<AdvanceCommand>,
}

impl AdvancePlan {
    fn for_song(song: &Song, next: Option<&Song>) -> Self {
        let mut commands = Vec::with_capacity(2);
        if song.stop_at_end() {
            commands.push(AdvanceCommand::Stop);
        }
        match next {
            Some(next) => commands.push(AdvanceCommand::Jump(next.id().clone())),
            // End of the program
            None if !song.stop_at_end() => commands.push(AdvanceCommand::Stop),
            None => {}
        }
        Self {
            song: song.id().clone(),
            commands,
        }
    }
}

/// Song-end state machine, stepped once per tick
#[derive(Debug, Clone)]
pub struct AutoAdvanceController {
    detection: EndDetection,
    crossing_window: f64,
    phase: AdvancePhase,
    previous_time: Option<f64>,
    previous_song: Option<CueId>,
}

impl AutoAdvanceController {
    /// Create a controller in the running state
    pub fn new(detection: EndDetection) -> Self {
        Self {
            detection,
            crossing_window: DEFAULT_CROSSING_WINDOW,
            phase: AdvancePhase::Running,
            previous_time: None,
            previous_song: None,
        }
    }

    /// Set the largest tick step counted as a crossing. Bigger steps are
    /// relocations and never end a song.
    pub fn with_crossing_window(mut self, beats: f64) -> Self {
        self.crossing_window = beats.max(0.0);
        self
    }

    /// Current phase
    pub fn phase(&self) -> AdvancePhase {
        self.phase
    }

    /// Step the state machine for a tick at `time`.
    ///
    /// Returns a plan only on the tick that enters [`AdvancePhase::Ended`].
    pub fn on_tick(
        &mut self,
        timeline: &Timeline,
        song: &Lookup,
        is_playing: bool,
        time: f64,
    ) -> Option<AdvancePlan> {
        let ended = if is_playing {
            self.ended_song(timeline, song, time)
        } else {
            None
        };

        self.previous_time = Some(time);
        self.previous_song = match song.resolution {
            Resolution::Resolved(_) => song.current.clone(),
            Resolution::Unresolved => None,
        };

        let Some(index) = ended else {
            self.phase = AdvancePhase::Running;
            return None;
        };

        if self.phase == AdvancePhase::Ended {
            return None;
        }
        self.phase = AdvancePhase::Ended;

        let ended_song = timeline.get(index)?;
        Some(AdvancePlan::for_song(ended_song, timeline.get(index + 1)))
    }

    /// Index of the song that ends at this tick
    fn ended_song(&self, timeline: &Timeline, song: &Lookup, time: f64) -> Option<usize> {
        match self.detection {
            EndDetection::Exact => match song.resolution {
                Resolution::Resolved(index) => {
                    let current = timeline.get(index)?;
                    (time == current.end().time).then_some(index)
                }
                Resolution::Unresolved => None,
            },
            EndDetection::Crossing => {
                // The song playing before this tick, or the one just resolved
                let index = self
                    .previous_song
                    .as_ref()
                    .and_then(|id| timeline.position(id))
                    .or(match song.resolution {
                        Resolution::Resolved(index) => Some(index),
                        Resolution::Unresolved => None,
                    })?;
                let end = timeline.get(index)?.end().time;
                let previous = self.previous_time?;
                let continuous = time - previous <= self.crossing_window;
                (continuous && previous < end && time >= end).then_some(index)
            }
        }
    }
}

/// Runs auto-advance plans on background tasks, one at a time
#[derive(Clone)]
pub struct AdvanceExecutor {
    transport: Arc<dyn Transport>,
    in_flight: Arc<AtomicBool>,
}

impl AdvanceExecutor {
    /// Create an executor issuing commands to `transport`
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a plan is still running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start `plan` unless another one is still outstanding
    pub fn dispatch(&self, plan: AdvancePlan) -> Option<JoinHandle<()>> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::warn!(
                "Song {} ended while a previous auto-advance is still running; skipped",
                plan.song
            );
            return None;
        }

        let transport = Arc::clone(&self.transport);
        let in_flight = Arc::clone(&self.in_flight);
        Some(tokio::spawn(async move {
            execute(&plan, transport.as_ref()).await;
            in_flight.store(false, Ordering::Release);
        }))
    }
}

/// Run each command in order. Failures are logged and do not stop the
/// remaining commands.
pub async fn execute(plan: &AdvancePlan, transport: &dyn Transport) {
    tracing::info!("Song {} ended: {:?}", plan.song, plan.commands);
    for command in &plan.commands {
        let result = match command {
            AdvanceCommand::Stop => transport.stop_playing().await,
            AdvanceCommand::Jump(id) => transport.jump_to_cue(id).await,
        };
        if let Err(e) = result {
            tracing::warn!("Auto-advance {:?} failed: {}", command, e);
        }
    }
}
