// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Process configuration for the speech stack.
//!
//! [`SpeechConfig`] collects everything tunable about the VAD and the two
//! speech-server adapters in one serializable struct, and knows how to fill
//! itself from `SPEECH_*` environment variables. Unparsable numeric values
//! fall back to their defaults with a warning instead of failing startup.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::audio::vad::VADParams;
use crate::services::stt::TranscriptionClient;
use crate::services::tts::SynthesisClient;

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_stt_model() -> String {
    TranscriptionClient::DEFAULT_MODEL.to_string()
}

fn default_stt_response_format() -> String {
    TranscriptionClient::DEFAULT_RESPONSE_FORMAT.to_string()
}

fn default_tts_model() -> String {
    SynthesisClient::DEFAULT_MODEL.to_string()
}

fn default_tts_voice() -> String {
    SynthesisClient::DEFAULT_VOICE.to_string()
}

fn default_tts_speed() -> f64 {
    SynthesisClient::DEFAULT_SPEED
}

fn default_tts_response_format() -> String {
    SynthesisClient::DEFAULT_RESPONSE_FORMAT.to_string()
}

fn default_timeout_secs() -> f64 {
    30.0
}

/// Configuration for the VAD and both speech-server adapters.
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Speech server base URL shared by both adapters.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token for the speech server, if it requires one.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Transcription model.
    #[serde(default = "default_stt_model")]
    pub stt_model: String,
    /// Fixed transcription language; unset means per-call hints apply.
    #[serde(default)]
    pub stt_language: Option<String>,
    /// Transcription response format.
    #[serde(default = "default_stt_response_format")]
    pub stt_response_format: String,
    /// Transcription request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub stt_timeout_secs: f64,

    /// Synthesis model.
    #[serde(default = "default_tts_model")]
    pub tts_model: String,
    /// Synthesis voice.
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
    /// Synthesis playback speed multiplier.
    #[serde(default = "default_tts_speed")]
    pub tts_speed: f64,
    /// Synthesis audio format.
    #[serde(default = "default_tts_response_format")]
    pub tts_response_format: String,
    /// Synthesis request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub tts_timeout_secs: f64,

    /// Voice activity detection parameters.
    #[serde(default)]
    pub vad: VADParams,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            stt_model: default_stt_model(),
            stt_language: None,
            stt_response_format: default_stt_response_format(),
            stt_timeout_secs: default_timeout_secs(),
            tts_model: default_tts_model(),
            tts_voice: default_tts_voice(),
            tts_speed: default_tts_speed(),
            tts_response_format: default_tts_response_format(),
            tts_timeout_secs: default_timeout_secs(),
            vad: VADParams::default(),
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("stt_model", &self.stt_model)
            .field("stt_language", &self.stt_language)
            .field("stt_response_format", &self.stt_response_format)
            .field("stt_timeout_secs", &self.stt_timeout_secs)
            .field("tts_model", &self.tts_model)
            .field("tts_voice", &self.tts_voice)
            .field("tts_speed", &self.tts_speed)
            .field("tts_response_format", &self.tts_response_format)
            .field("tts_timeout_secs", &self.tts_timeout_secs)
            .field("vad", &self.vad)
            .finish()
    }
}

impl SpeechConfig {
    /// Build a config from `SPEECH_*` environment variables.
    ///
    /// Unset variables keep their defaults. Variables set to an empty
    /// string are treated as unset, and numeric values that fail to parse
    /// are logged and ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env_string("SPEECH_SERVER_URL").unwrap_or(defaults.base_url),
            api_key: env_string("SPEECH_SERVER_API_KEY"),
            stt_model: env_string("SPEECH_SERVER_STT_MODEL").unwrap_or(defaults.stt_model),
            stt_language: env_string("SPEECH_SERVER_LANGUAGE"),
            stt_response_format: env_string("SPEECH_SERVER_STT_RESPONSE_FORMAT")
                .unwrap_or(defaults.stt_response_format),
            stt_timeout_secs: env_parse("SPEECH_SERVER_STT_TIMEOUT", defaults.stt_timeout_secs),
            tts_model: env_string("SPEECH_SERVER_TTS_MODEL").unwrap_or(defaults.tts_model),
            tts_voice: env_string("SPEECH_SERVER_TTS_VOICE").unwrap_or(defaults.tts_voice),
            tts_speed: env_parse("SPEECH_SERVER_TTS_SPEED", defaults.tts_speed),
            tts_response_format: env_string("SPEECH_SERVER_TTS_RESPONSE_FORMAT")
                .unwrap_or(defaults.tts_response_format),
            tts_timeout_secs: env_parse("SPEECH_SERVER_TTS_TIMEOUT", defaults.tts_timeout_secs),
            vad: VADParams {
                threshold: env_parse("SPEECH_VAD_THRESHOLD", defaults.vad.threshold),
                min_speech_duration: env_parse(
                    "SPEECH_VAD_MIN_SPEECH_DURATION",
                    defaults.vad.min_speech_duration,
                ),
                silence_timeout: env_parse(
                    "SPEECH_VAD_SILENCE_TIMEOUT",
                    defaults.vad.silence_timeout,
                ),
            },
        }
    }

    /// VAD parameters from this config.
    pub fn vad_params(&self) -> VADParams {
        self.vad.clone()
    }

    /// Build a transcription client from this config.
    pub fn stt_client(&self) -> TranscriptionClient {
        let mut client = TranscriptionClient::new(self.base_url.clone())
            .with_model(self.stt_model.clone())
            .with_response_format(self.stt_response_format.clone())
            .with_timeout(duration_from_secs(self.stt_timeout_secs));
        if let Some(ref language) = self.stt_language {
            client = client.with_language(language.clone());
        }
        if let Some(ref key) = self.api_key {
            client = client.with_api_key(key.clone());
        }
        client
    }

    /// Build a synthesis client from this config.
    pub fn tts_client(&self) -> SynthesisClient {
        let mut client = SynthesisClient::new(self.base_url.clone())
            .with_model(self.tts_model.clone())
            .with_voice(self.tts_voice.clone())
            .with_speed(self.tts_speed)
            .with_response_format(self.tts_response_format.clone())
            .with_timeout(duration_from_secs(self.tts_timeout_secs));
        if let Some(ref key) = self.api_key {
            client = client.with_api_key(key.clone());
        }
        client
    }
}

/// Read a non-empty, trimmed string variable.
fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => None,
    }
}

/// Parse a numeric variable, keeping `default` when unset or unparsable.
fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("SpeechConfig: ignoring unparsable {name}={raw:?}");
                default
            }
        },
        Err(_) => default,
    }
}

/// Seconds to a `Duration`, guarding against non-finite or non-positive
/// values that would otherwise panic.
fn duration_from_secs(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::from_secs(30)
    }
}
