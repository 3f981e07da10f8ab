// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Setlist - live-performance cue sequencer
//!
//! Turns a transport's cue markers into songs and sections, follows the
//! playhead, advances between songs and pushes state to connected clients.

pub mod api;
pub mod arrangement;
pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod timeline;
pub mod timing;
pub mod transport;
