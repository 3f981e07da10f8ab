// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transport abstraction layer.
//!
//! The transport owns the playback clock and the cue list. This module
//! provides a trait over it so the engine can be driven by the simulated
//! transport, a test double, or an integration with external software.

pub mod sim;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::arrangement::{CueId, CuePoint};
use crate::error::TransportError;

pub use sim::SimTransport;

/// Transport properties that can be observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickField {
    /// Play/stop state
    IsPlaying,
    /// Tempo in BPM
    Tempo,
    /// Song position in beats
    CurrentSongTime,
}

impl TickField {
    /// All observable fields
    pub const ALL: [TickField; 3] = [
        TickField::IsPlaying,
        TickField::Tempo,
        TickField::CurrentSongTime,
    ];

    /// Property name as the transport reports it
    pub fn name(&self) -> &'static str {
        match self {
            TickField::IsPlaying => "is_playing",
            TickField::Tempo => "tempo",
            TickField::CurrentSongTime => "current_song_time",
        }
    }
}

/// A change notification from the transport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    /// Playback started or stopped
    IsPlaying(bool),
    /// Tempo changed
    Tempo(f64),
    /// Song position advanced (raw, unrounded beats)
    SongTime(f64),
}

impl TransportEvent {
    /// Field this event reports
    pub fn field(&self) -> TickField {
        match self {
            TransportEvent::IsPlaying(_) => TickField::IsPlaying,
            TransportEvent::Tempo(_) => TickField::Tempo,
            TransportEvent::SongTime(_) => TickField::CurrentSongTime,
        }
    }
}

/// Where a transport delivers events for a field
pub type TickSink = mpsc::UnboundedSender<TransportEvent>;

/// Trait for transport implementations.
///
/// Commands are asynchronous round-trips; events arrive on the sinks
/// registered with [`Transport::add_listener`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the current cue list
    async fn cues(&self) -> Result<Vec<CuePoint>, TransportError>;

    /// Deliver changes of `field` to `sink`
    fn add_listener(&self, field: TickField, sink: TickSink);

    /// Start playback
    async fn start_playing(&self) -> Result<(), TransportError>;

    /// Stop playback
    async fn stop_playing(&self) -> Result<(), TransportError>;

    /// Move the playhead to the cue with `id`
    async fn jump_to_cue(&self, id: &CueId) -> Result<(), TransportError>;
}

/// Register one queue for every field.
///
/// All events land on the returned receiver in the order the transport
/// produced them, which gives the engine a single consumer.
pub fn subscribe(transport: &dyn Transport) -> mpsc::UnboundedReceiver<TransportEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    for field in TickField::ALL {
        transport.add_listener(field, tx.clone());
    }
    rx
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Command as seen by the mock
    #[derive(Debug, Clone, PartialEq)]
    pub enum Command {
        Start,
        Stop,
        Jump(CueId),
    }

    /// Transport that records commands and fails on request
    #[derive(Default)]
    pub struct MockTransport {
        pub cues: Mutex<Vec<CuePoint>>,
        pub commands: Arc<Mutex<Vec<Command>>>,
        pub fail_stop: Mutex<bool>,
        pub fail_jump: Mutex<bool>,
        pub sinks: Mutex<Vec<TickSink>>,
    }

    impl MockTransport {
        pub fn with_cues(cues: Vec<CuePoint>) -> Self {
            Self {
                cues: Mutex::new(cues),
                ..Default::default()
            }
        }

        pub fn commands(&self) -> Vec<Command> {
            self.commands.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn cues(&self) -> Result<Vec<CuePoint>, TransportError> {
            Ok(self.cues.lock().unwrap().clone())
        }

        fn add_listener(&self, _field: TickField, sink: TickSink) {
            self.sinks.lock().unwrap().push(sink);
        }

        async fn start_playing(&self) -> Result<(), TransportError> {
            self.commands.lock().unwrap().push(Command::Start);
            Ok(())
        }

        async fn stop_playing(&self) -> Result<(), TransportError> {
            self.commands.lock().unwrap().push(Command::Stop);
            if *self.fail_stop.lock().unwrap() {
                return Err(TransportError::Rejected("stop refused".to_string()));
            }
            Ok(())
        }

        async fn jump_to_cue(&self, id: &CueId) -> Result<(), TransportError> {
            self.commands.lock().unwrap().push(Command::Jump(id.clone()));
            if *self.fail_jump.lock().unwrap() {
                return Err(TransportError::Rejected("jump refused".to_string()));
            }
            Ok(())
        }
    }
}
