// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Voice Activity Detection (VAD) subsystem.

pub mod energy;

use serde::{Deserialize, Serialize};

use crate::audio::frame::AudioFrame;

/// Detector states, as observed from outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VADState {
    /// No open segment and no candidate frames held.
    Idle,
    /// Candidate frames held, start of speech not yet confirmed.
    Accumulating,
    /// An open speech segment is being tracked.
    Speaking,
}

/// Parameters for energy-based voice activity detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VADParams {
    /// Peak absolute amplitude at or above which a frame counts as speech.
    pub threshold: i32,
    /// Seconds of above-threshold audio required to confirm a start.
    pub min_speech_duration: f64,
    /// Seconds of accumulated below-threshold audio that closes a segment.
    pub silence_timeout: f64,
}

impl Default for VADParams {
    fn default() -> Self {
        Self {
            threshold: 500,
            min_speech_duration: 0.1,
            silence_timeout: 0.35,
        }
    }
}

/// Kind of detector event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceActivityKind {
    StartOfSpeech,
    EndOfSpeech,
}

/// Event emitted when a speech segment opens or closes.
#[derive(Debug, Clone)]
pub struct VoiceActivityEvent {
    pub kind: VoiceActivityKind,
    /// Stream sample position (per channel) the event refers to. For both
    /// kinds this is the position at which the segment was confirmed.
    pub samples_index: u64,
    /// Unix timestamp at which the event was produced.
    pub timestamp: f64,
    /// Seconds of above-threshold audio in the segment. Zero for starts.
    pub speech_duration: f64,
    /// Seconds of below-threshold audio accumulated at close. Zero for
    /// starts.
    pub silence_duration: f64,
    /// The frames belonging to the segment at the time of the event.
    pub frames: Vec<AudioFrame>,
}
