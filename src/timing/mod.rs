// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing module.
//!
//! This module provides the tempo-driven clock behind the simulated
//! transport.

pub mod clock;

pub use clock::{ClockState, TransportClock, MAX_BPM, MIN_BPM};
