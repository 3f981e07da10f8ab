// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Shared application state.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;

use crate::arrangement::{CueId, CueParser, CuePoint};
use crate::engine::{ObserverRegistry, PlaybackState};
use crate::error::{ApiError, ApiResult, TransportError};
use crate::timeline::{ReorderManager, SharedTimeline, Timeline};
use crate::transport::Transport;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub transport: Arc<dyn Transport>,
    pub timeline: SharedTimeline,
    pub parser: Arc<CueParser>,
    pub reorder: ReorderManager,
    pub playback: watch::Receiver<PlaybackState>,
    pub observers: ObserverRegistry,
    /// Cues from the last fetch; jump requests are checked against these
    cues: Arc<ArcSwap<Vec<CuePoint>>>,
}

impl AppState {
    pub fn new(
        transport: Arc<dyn Transport>,
        timeline: SharedTimeline,
        parser: CueParser,
        playback: watch::Receiver<PlaybackState>,
        observers: ObserverRegistry,
    ) -> Self {
        Self {
            transport,
            reorder: ReorderManager::new(timeline.clone()),
            timeline,
            parser: Arc::new(parser),
            playback,
            observers,
            cues: Arc::new(ArcSwap::from_pointee(Vec::new())),
        }
    }

    /// Re-read cues from the transport, then parse and swap in a new timeline.
    ///
    /// A transport failure leaves the current timeline and cue cache alone.
    pub async fn refresh_timeline(&self) -> ApiResult<Arc<Timeline>> {
        let cues = self.transport.cues().await?;
        let outcome = self.parser.parse(&cues);
        for issue in &outcome.issues {
            tracing::warn!("Cue list: {}", issue);
        }

        self.cues.store(Arc::new(cues));
        let timeline = self.timeline.replace(outcome.timeline);
        tracing::debug!("Timeline rebuilt with {} songs", timeline.len());

        if timeline.is_empty() {
            return Err(ApiError::NoSongs);
        }
        Ok(timeline)
    }

    /// Cues from the last fetch
    pub fn cached_cues(&self) -> Arc<Vec<CuePoint>> {
        self.cues.load_full()
    }

    /// Move the transport to a known cue
    pub async fn jump_to_cue(&self, id: &CueId) -> ApiResult<()> {
        if !self.cues.load().iter().any(|cue| &cue.id == id) {
            return Err(TransportError::CueNotFound(id.clone()).into());
        }
        self.transport.jump_to_cue(id).await?;
        tracing::info!("Jumped to cue {}", id);
        Ok(())
    }

    /// Start playback unless it is already running
    pub async fn start_playing(&self) -> ApiResult<()> {
        if self.playback.borrow().is_playing {
            return Err(ApiError::AlreadyPlaying);
        }
        self.transport.start_playing().await?;
        tracing::info!("Playback started");
        Ok(())
    }

    /// Stop playback unless it is already stopped
    pub async fn stop_playing(&self) -> ApiResult<()> {
        if !self.playback.borrow().is_playing {
            return Err(ApiError::AlreadyStopped);
        }
        self.transport.stop_playing().await?;
        tracing::info!("Playback stopped");
        Ok(())
    }

    /// Reorder the songs of the current timeline
    pub fn reorder_songs(&self, order: &[CueId]) -> ApiResult<Arc<Timeline>> {
        Ok(self.reorder.apply(order)?)
    }

    /// Latest published playback state
    pub fn playback_state(&self) -> PlaybackState {
        self.playback.borrow().clone()
    }
}
