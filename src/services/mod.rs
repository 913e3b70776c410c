// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Speech service adapters (STT, TTS) and the traits they implement.

pub mod shared;
pub mod stt;
pub mod tts;

use async_trait::async_trait;

use crate::audio::frame::AudioFrame;
use crate::error::SpeechError;
use crate::services::stt::TranscriptionResult;
use crate::services::tts::SynthesisResult;

/// Base trait for all speech services.
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Get the model name used by this service.
    ///
    /// Returned by value because some services keep their model behind a
    /// swappable options snapshot.
    fn model(&self) -> Option<String> {
        None
    }
}

/// Trait for batch speech recognition services.
#[async_trait]
pub trait RecognitionService: SpeechService {
    /// Transcribe the given frames and return the recognized text.
    ///
    /// `language_hint` is advisory; an adapter configured with a fixed
    /// language ignores it.
    async fn recognize(
        &self,
        frames: &[AudioFrame],
        language_hint: Option<&str>,
    ) -> Result<TranscriptionResult, SpeechError>;
}

/// Trait for speech synthesis services.
#[async_trait]
pub trait SynthesisService: SpeechService {
    /// Convert text to a single audio payload.
    async fn synthesize(&self, text: &str) -> Result<SynthesisResult, SpeechError>;
}
