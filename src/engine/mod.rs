// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Tick handling.
//!
//! The engine is the single consumer of transport events. For every song
//! position change it resolves the current song and section, recomputes
//! progress, steps auto-advance and broadcasts what changed:
//!
//! ```text
//! Transport ──events──▶ Engine ──▶ TimelineIndex / progress
//!                          │
//!                          ├──▶ AutoAdvanceController ──commands──▶ Transport
//!                          ├──▶ StateBroadcaster ──▶ observers
//!                          └──▶ watch::Sender<PlaybackState>
//! ```

pub mod advance;
pub mod broadcast;
pub mod state;

pub use advance::{
    AdvanceCommand, AdvanceExecutor, AdvancePhase, AdvancePlan, AutoAdvanceController,
    EndDetection, DEFAULT_CROSSING_WINDOW,
};
pub use broadcast::{
    Delivery, Observer, ObserverId, ObserverRegistry, PushMessage, StateBroadcaster,
};
pub use state::PlaybackState;

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::config::EngineSettings;
use crate::timeline::{locate, section_progress, song_progress, Position, SharedTimeline};
use crate::transport::{Transport, TransportEvent};

/// What one handled event produced
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Song/section lookup, for position ticks
    pub position: Option<Position>,
    /// Auto-advance plan started by this tick
    pub plan: Option<AdvancePlan>,
    /// Messages broadcast to observers
    pub messages: Vec<PushMessage>,
}

/// Tick handler owning the playback state
pub struct Engine {
    timeline: SharedTimeline,
    state: PlaybackState,
    advance: AutoAdvanceController,
    executor: AdvanceExecutor,
    broadcaster: StateBroadcaster,
    published: watch::Sender<PlaybackState>,
}

impl Engine {
    /// Create an engine reading `timeline` and commanding `transport`
    pub fn new(
        transport: Arc<dyn Transport>,
        timeline: SharedTimeline,
        observers: ObserverRegistry,
        settings: &EngineSettings,
    ) -> Self {
        let (published, _) = watch::channel(PlaybackState::default());
        Self {
            timeline,
            state: PlaybackState::default(),
            advance: AutoAdvanceController::new(settings.end_detection)
                .with_crossing_window(settings.crossing_window),
            executor: AdvanceExecutor::new(transport),
            broadcaster: StateBroadcaster::new(observers),
            published,
        }
    }

    /// Current playback state
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Receiver for published copies of the playback state
    pub fn subscribe_state(&self) -> watch::Receiver<PlaybackState> {
        self.published.subscribe()
    }

    /// Handle one transport event.
    ///
    /// Returns `None` for a position tick that floors to the current time.
    pub fn handle(&mut self, event: TransportEvent) -> Option<TickReport> {
        let (position, plan) = match event {
            TransportEvent::IsPlaying(playing) => {
                self.state.is_playing = playing;
                (None, None)
            }
            TransportEvent::Tempo(bpm) => {
                self.state.tempo = bpm;
                (None, None)
            }
            TransportEvent::SongTime(raw) => {
                let time = raw.floor();
                if time == self.state.current_time {
                    return None;
                }
                let (position, plan) = self.on_song_time(time);
                (Some(position), plan)
            }
        };

        let messages = self.broadcaster.broadcast(&self.state);
        self.published.send_replace(self.state.clone());
        Some(TickReport {
            position,
            plan,
            messages,
        })
    }

    fn on_song_time(&mut self, time: f64) -> (Position, Option<AdvancePlan>) {
        self.state.current_time = time;
        let timeline = self.timeline.load();

        let position = locate(
            &timeline,
            time,
            self.state.current_song_id.as_ref(),
            self.state.current_section_id.as_ref(),
        );
        if !position.song.is_resolved() {
            tracing::debug!("No song at {}, keeping {:?}", time, position.song.current);
        }
        self.state.current_song_id = position.song.current.clone();
        self.state.current_section_id = position.section.current.clone();

        let song = self
            .state
            .current_song_id
            .as_ref()
            .and_then(|id| timeline.find(id));
        self.state.song_progress_percent = song_progress(song, time);
        self.state.section_progress_percent =
            section_progress(song, self.state.current_section_id.as_ref(), time);

        let plan = self
            .advance
            .on_tick(&timeline, &position.song, self.state.is_playing, time);
        if let Some(plan) = &plan {
            self.executor.dispatch(plan.clone());
        }

        (position, plan)
    }

    /// Consume transport events until the transport drops every sender
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<TransportEvent>) {
        tracing::info!("Engine started");
        while let Some(event) = events.recv().await {
            if let Some(report) = self.handle(event) {
                if let Some(plan) = &report.plan {
                    tracing::debug!("Auto-advance dispatched for song {}", plan.song);
                }
            }
        }
        tracing::info!("Transport closed, engine stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrangement::{parse_cues, CueId, CuePoint};
    use crate::timeline::Timeline;
    use crate::transport::mock::{Command, MockTransport};

    fn show() -> Timeline {
        parse_cues(&[
            CuePoint::new(0, "A <start>", 0.0),
            CuePoint::new(1, "Verse", 10.0),
            CuePoint::new(2, "A <end>", 30.0),
            CuePoint::new(3, "B <start>", 30.0),
            CuePoint::new(4, "B <end>", 60.0),
        ])
        .timeline
    }

    fn engine(transport: Arc<MockTransport>) -> Engine {
        Engine::new(
            transport,
            SharedTimeline::new(show()),
            ObserverRegistry::default(),
            &EngineSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_position_tick_updates_state() {
        let mut engine = engine(Arc::new(MockTransport::default()));

        let report = engine.handle(TransportEvent::SongTime(15.7)).unwrap();
        let state = engine.state();
        assert_eq!(state.current_time, 15.0);
        assert_eq!(state.current_song_id, Some(CueId::from(0)));
        assert_eq!(state.current_section_id, Some(CueId::from(1)));
        assert_eq!(state.song_progress_percent, 50.0);
        assert_eq!(state.section_progress_percent, 25.0);
        assert!(report.position.unwrap().song.is_resolved());
    }

    #[tokio::test]
    async fn test_same_floored_time_is_ignored() {
        let mut engine = engine(Arc::new(MockTransport::default()));
        assert!(engine.handle(TransportEvent::SongTime(12.2)).is_some());
        assert!(engine.handle(TransportEvent::SongTime(12.9)).is_none());
        assert!(engine.handle(TransportEvent::SongTime(13.0)).is_some());
    }

    #[tokio::test]
    async fn test_broadcasts_only_changes() {
        let mut engine = engine(Arc::new(MockTransport::default()));

        let report = engine.handle(TransportEvent::IsPlaying(true)).unwrap();
        assert_eq!(report.messages, vec![PushMessage::IsPlaying(true)]);

        let report = engine.handle(TransportEvent::SongTime(11.0)).unwrap();
        engine.handle(TransportEvent::SongTime(12.0)).unwrap();
        let report_again = engine.handle(TransportEvent::SongTime(13.0)).unwrap();

        assert!(report.messages.contains(&PushMessage::CurrentSongId(Some(CueId::from(0)))));
        assert!(!report_again
            .messages
            .iter()
            .any(|m| matches!(m, PushMessage::CurrentSongId(_))));
        assert_eq!(report_again.messages.last(), Some(&PushMessage::CurrentSongTime(13.0)));
    }

    #[tokio::test]
    async fn test_published_state_follows_ticks() {
        let mut engine = engine(Arc::new(MockTransport::default()));
        let rx = engine.subscribe_state();

        engine.handle(TransportEvent::Tempo(128.0));
        engine.handle(TransportEvent::SongTime(40.0));

        let published = rx.borrow().clone();
        assert_eq!(published.tempo, 128.0);
        assert_eq!(published.current_song_id, Some(CueId::from(3)));
    }

    #[tokio::test]
    async fn test_song_end_dispatches_advance() {
        let transport = Arc::new(MockTransport::default());
        let mut engine = engine(transport.clone());

        engine.handle(TransportEvent::IsPlaying(true));
        engine.handle(TransportEvent::SongTime(29.0));
        let report = engine.handle(TransportEvent::SongTime(30.0)).unwrap();
        let plan = report.plan.unwrap();
        assert_eq!(plan.song, CueId::from(0));

        // Let the spawned command task run
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(
            transport.commands(),
            vec![Command::Stop, Command::Jump(CueId::from(3))]
        );
    }

    #[tokio::test]
    async fn test_no_advance_while_stopped() {
        let transport = Arc::new(MockTransport::default());
        let mut engine = engine(transport.clone());

        let report = engine.handle(TransportEvent::SongTime(30.0)).unwrap();
        assert!(report.plan.is_none());
        tokio::task::yield_now().await;
        assert!(transport.commands().is_empty());
    }

    #[tokio::test]
    async fn test_reordered_timeline_is_seen_next_tick() {
        let transport = Arc::new(MockTransport::default());
        let timeline = SharedTimeline::new(show());
        let mut engine = Engine::new(
            transport,
            timeline.clone(),
            ObserverRegistry::default(),
            &EngineSettings::default(),
        );

        let songs = show().songs().iter().rev().cloned().collect();
        timeline.replace(Timeline::new(songs));

        engine.handle(TransportEvent::IsPlaying(true));
        // B is now first in sequence and wins the shared boundary
        let report = engine.handle(TransportEvent::SongTime(30.0)).unwrap();
        assert_eq!(engine.state().current_song_id, Some(CueId::from(3)));
        assert!(report.plan.is_none());
    }

    #[tokio::test]
    async fn test_crossing_engine_ignores_jump_past_end() {
        let transport = Arc::new(MockTransport::default());
        let settings = EngineSettings {
            end_detection: EndDetection::Crossing,
            ..EngineSettings::default()
        };
        let mut engine = Engine::new(
            transport.clone(),
            SharedTimeline::new(show()),
            ObserverRegistry::default(),
            &settings,
        );

        engine.handle(TransportEvent::IsPlaying(true));
        engine.handle(TransportEvent::SongTime(20.0));
        let report = engine.handle(TransportEvent::SongTime(45.0)).unwrap();
        assert!(report.plan.is_none());
        assert_eq!(engine.state().current_song_id, Some(CueId::from(3)));

        tokio::task::yield_now().await;
        assert!(transport.commands().is_empty());
    }

    #[tokio::test]
    async fn test_run_drains_events() {
        let transport = Arc::new(MockTransport::default());
        let engine = engine(transport);
        let rx = engine.subscribe_state();
        let (tx, events) = mpsc::unbounded_channel();

        tx.send(TransportEvent::SongTime(5.0)).unwrap();
        tx.send(TransportEvent::IsPlaying(true)).unwrap();
        drop(tx);
        engine.run(events).await;

        let state = rx.borrow().clone();
        assert!(state.is_playing);
        assert_eq!(state.current_time, 5.0);
    }
}
