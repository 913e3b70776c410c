// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Common re-exports for convenient use of the voicebridge crate.
//!
//! ```
//! use voicebridge::prelude::*;
//! ```

pub use std::sync::Arc;

pub use crate::audio::frame::{AudioFrame, SpeechSegment};
pub use crate::audio::vad::energy::EnergyVAD;
pub use crate::audio::vad::{VADParams, VADState, VoiceActivityEvent, VoiceActivityKind};
pub use crate::config::SpeechConfig;
pub use crate::error::SpeechError;
pub use crate::services::stt::{TranscriptionClient, TranscriptionResult};
pub use crate::services::tts::{
    SynthesisClient, SynthesisOptions, SynthesisOptionsUpdate, SynthesisResult,
};
pub use crate::services::{RecognitionService, SpeechService, SynthesisService};
pub use crate::session::{SessionHandle, SessionRecord, SessionRegistry};
