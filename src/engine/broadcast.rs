// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Push messages for connected observers.
//!
//! Only fields whose value changed since the last broadcast are sent. Each
//! observer has its own bounded queue so a slow client never holds up the
//! tick handler.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};

use super::PlaybackState;
use crate::arrangement::CueId;

/// One field update, sent to observers as `{"type": ..., "value": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PushMessage {
    IsPlaying(bool),
    Tempo(f64),
    CurrentSongId(Option<CueId>),
    CurrentSectionId(Option<CueId>),
    CurrentSongProgress(f64),
    CurrentSectionProgress(f64),
    CurrentSongTime(f64),
}

impl PushMessage {
    /// JSON text frame for this message
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Identifier handed out on registration
pub type ObserverId = u64;

/// A registered observer's end of its queue
pub struct Observer {
    pub id: ObserverId,
    pub messages: mpsc::Receiver<PushMessage>,
}

/// Counts from one publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub skipped: usize,
    pub removed: usize,
}

struct Registry {
    next_id: ObserverId,
    observers: HashMap<ObserverId, mpsc::Sender<PushMessage>>,
}

/// Set of connected observers
#[derive(Clone)]
pub struct ObserverRegistry {
    inner: Arc<Mutex<Registry>>,
    capacity: usize,
}

impl ObserverRegistry {
    /// Create a registry with `capacity` queued messages per observer
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                observers: HashMap::new(),
            })),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an observer
    pub fn register(&self) -> Observer {
        let (tx, rx) = mpsc::channel(self.capacity);
        let mut registry = self.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.observers.insert(id, tx);
        tracing::info!("Observer {} connected ({} total)", id, registry.observers.len());
        Observer { id, messages: rx }
    }

    /// Remove an observer
    pub fn unregister(&self, id: ObserverId) {
        let mut registry = self.lock();
        if registry.observers.remove(&id).is_some() {
            tracing::info!("Observer {} disconnected ({} left)", id, registry.observers.len());
        }
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.lock().observers.len()
    }

    /// Whether no observer is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue `message` for every observer without waiting.
    ///
    /// Observers with a full queue miss this message; closed ones are removed.
    pub fn publish(&self, message: &PushMessage) -> Delivery {
        let mut delivery = Delivery::default();
        let mut registry = self.lock();
        registry.observers.retain(|id, tx| match tx.try_send(message.clone()) {
            Ok(()) => {
                delivery.delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Observer {} is lagging; dropped {:?}", id, message);
                delivery.skipped += 1;
                true
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!("Observer {} closed", id);
                delivery.removed += 1;
                false
            }
        });
        delivery
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Sends state changes to observers, one message per changed field
pub struct StateBroadcaster {
    last: PlaybackState,
    observers: ObserverRegistry,
}

impl StateBroadcaster {
    /// Create a broadcaster whose baseline is the initial playback state
    pub fn new(observers: ObserverRegistry) -> Self {
        Self {
            last: PlaybackState::default(),
            observers,
        }
    }

    /// Messages for fields of `state` that differ from the last broadcast
    pub fn diff(&self, state: &PlaybackState) -> Vec<PushMessage> {
        let last = &self.last;
        let mut messages = Vec::new();
        if state.is_playing != last.is_playing {
            messages.push(PushMessage::IsPlaying(state.is_playing));
        }
        if state.tempo != last.tempo {
            messages.push(PushMessage::Tempo(state.tempo));
        }
        if state.current_song_id != last.current_song_id {
            messages.push(PushMessage::CurrentSongId(state.current_song_id.clone()));
        }
        if state.current_section_id != last.current_section_id {
            messages.push(PushMessage::CurrentSectionId(state.current_section_id.clone()));
        }
        if state.song_progress_percent != last.song_progress_percent {
            messages.push(PushMessage::CurrentSongProgress(state.song_progress_percent));
        }
        if state.section_progress_percent != last.section_progress_percent {
            messages.push(PushMessage::CurrentSectionProgress(state.section_progress_percent));
        }
        if state.current_time != last.current_time {
            messages.push(PushMessage::CurrentSongTime(state.current_time));
        }
        messages
    }

    /// Publish changed fields and remember `state` as broadcast
    pub fn broadcast(&mut self, state: &PlaybackState) -> Vec<PushMessage> {
        let messages = self.diff(state);
        for message in &messages {
            self.observers.publish(message);
        }
        self.last = state.clone();
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_json() {
        let json = PushMessage::IsPlaying(true).to_json().unwrap();
        assert_eq!(json, r#"{"type":"is_playing","value":true}"#);

        let json = PushMessage::CurrentSongId(Some(CueId::from(3))).to_json().unwrap();
        assert_eq!(json, r#"{"type":"current_song_id","value":"3"}"#);

        let json = PushMessage::CurrentSectionId(None).to_json().unwrap();
        assert_eq!(json, r#"{"type":"current_section_id","value":null}"#);

        let json = PushMessage::CurrentSongTime(12.0).to_json().unwrap();
        assert_eq!(json, r#"{"type":"current_song_time","value":12.0}"#);
    }

    #[test]
    fn test_diff_only_changed_fields_in_order() {
        let broadcaster = StateBroadcaster::new(ObserverRegistry::default());
        let state = PlaybackState {
            current_time: 12.0,
            current_song_id: Some(CueId::from(0)),
            song_progress_percent: 40.0,
            ..PlaybackState::default()
        };

        assert_eq!(
            broadcaster.diff(&state),
            vec![
                PushMessage::CurrentSongId(Some(CueId::from(0))),
                PushMessage::CurrentSongProgress(40.0),
                PushMessage::CurrentSongTime(12.0),
            ]
        );
    }

    #[test]
    fn test_unchanged_state_sends_nothing() {
        let mut broadcaster = StateBroadcaster::new(ObserverRegistry::default());
        let state = PlaybackState {
            is_playing: true,
            tempo: 120.0,
            ..PlaybackState::default()
        };
        assert_eq!(broadcaster.broadcast(&state).len(), 2);
        assert!(broadcaster.broadcast(&state).is_empty());
    }

    #[test]
    fn test_observers_receive_messages() {
        let registry = ObserverRegistry::new(8);
        let mut first = registry.register();
        let mut second = registry.register();
        assert_ne!(first.id, second.id);

        let delivery = registry.publish(&PushMessage::Tempo(98.0));
        assert_eq!(delivery.delivered, 2);
        assert_eq!(first.messages.try_recv().unwrap(), PushMessage::Tempo(98.0));
        assert_eq!(second.messages.try_recv().unwrap(), PushMessage::Tempo(98.0));
    }

    #[test]
    fn test_full_queue_is_skipped() {
        let registry = ObserverRegistry::new(1);
        let mut slow = registry.register();

        registry.publish(&PushMessage::Tempo(100.0));
        let delivery = registry.publish(&PushMessage::Tempo(101.0));
        assert_eq!(delivery.skipped, 1);
        assert_eq!(registry.len(), 1);

        assert_eq!(slow.messages.try_recv().unwrap(), PushMessage::Tempo(100.0));
        assert!(slow.messages.try_recv().is_err());
    }

    #[test]
    fn test_closed_observer_is_removed() {
        let registry = ObserverRegistry::new(4);
        let gone = registry.register();
        let _kept = registry.register();
        drop(gone);

        let delivery = registry.publish(&PushMessage::IsPlaying(true));
        assert_eq!(delivery.removed, 1);
        assert_eq!(delivery.delivered, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister() {
        let registry = ObserverRegistry::new(4);
        let observer = registry.register();
        registry.unregister(observer.id);
        assert!(registry.is_empty());
    }
}
