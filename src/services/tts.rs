// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Speech-server synthesis adapter.
//!
//! Sends text to a speech server exposing `POST /v1/audio/speech` and
//! returns the complete encoded audio payload in one piece. The endpoint
//! does not stream, so a request maps to exactly one response body.
//!
//! Tunable options (model, voice, speed, response format) live in an
//! immutable snapshot behind the client. [`SynthesisClient::update_options`]
//! swaps the whole snapshot atomically and each synthesis call captures the
//! snapshot once up front, so a request never observes a half-applied
//! update.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::SpeechError;
use crate::services::shared::request_id_header;
use crate::services::{SpeechService, SynthesisService};

/// Synthesis endpoint path, relative to the server base URL.
const SPEECH_ENDPOINT: &str = "/v1/audio/speech";

/// MIME type assumed when the server does not declare one.
const DEFAULT_MIME_TYPE: &str = "audio/mpeg";

// ---------------------------------------------------------------------------
// Option and result types
// ---------------------------------------------------------------------------

/// Tunable synthesis options.
///
/// Held behind the client as an immutable snapshot; see
/// [`SynthesisClient::update_options`].
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOptions {
    /// Model identifier.
    pub model: String,
    /// Voice name.
    pub voice: String,
    /// Playback speed multiplier.
    pub speed: f64,
    /// Encoded audio format requested from the server.
    pub response_format: String,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            model: SynthesisClient::DEFAULT_MODEL.to_string(),
            voice: SynthesisClient::DEFAULT_VOICE.to_string(),
            speed: SynthesisClient::DEFAULT_SPEED,
            response_format: SynthesisClient::DEFAULT_RESPONSE_FORMAT.to_string(),
        }
    }
}

/// Partial options change; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct SynthesisOptionsUpdate {
    pub model: Option<String>,
    pub voice: Option<String>,
    pub speed: Option<f64>,
    pub response_format: Option<String>,
}

/// Result of one synthesis request.
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// Complete encoded audio payload.
    pub audio: Vec<u8>,
    /// MIME type from the response `Content-Type` header.
    pub mime_type: String,
    /// Nominal sample rate of the decoded audio.
    pub sample_rate: u32,
    /// Nominal channel count of the decoded audio.
    pub num_channels: u16,
    /// Backend request id from the `x-request-id` header.
    pub request_id: Option<String>,
}

/// JSON body for the synthesis endpoint.
#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
    speed: f64,
}

// ---------------------------------------------------------------------------
// SynthesisClient
// ---------------------------------------------------------------------------

/// Speech-server synthesis client.
///
/// # Example
///
/// ```rust,no_run
/// use voicebridge::services::tts::SynthesisClient;
///
/// let tts = SynthesisClient::new("http://localhost:8000")
///     .with_voice("jenny_dioco")
///     .with_speed(1.1);
/// ```
pub struct SynthesisClient {
    /// Server base URL without trailing slash.
    base_url: String,
    /// Optional bearer token.
    api_key: Option<String>,
    /// Default per-request timeout.
    timeout: Duration,
    /// Current options snapshot; replaced wholesale on update.
    options: RwLock<Arc<SynthesisOptions>>,
    /// HTTP client for API requests.
    client: reqwest::Client,
}

impl SynthesisClient {
    /// Default synthesis model.
    pub const DEFAULT_MODEL: &'static str = "speaches-ai/piper-en_GB-jenny_dioco-medium";

    /// Default voice.
    pub const DEFAULT_VOICE: &'static str = "jenny_dioco";

    /// Default playback speed multiplier.
    pub const DEFAULT_SPEED: f64 = 1.0;

    /// Default encoded audio format.
    pub const DEFAULT_RESPONSE_FORMAT: &'static str = "mp3";

    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Nominal sample rate of decoded output audio.
    pub const SAMPLE_RATE: u32 = 24_000;

    /// Nominal channel count of decoded output audio.
    pub const NUM_CHANNELS: u16 = 1;

    /// Create a client for the given server base URL.
    ///
    /// A trailing slash on `base_url` is stripped so endpoint paths can be
    /// appended verbatim.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: Self::DEFAULT_TIMEOUT,
            options: RwLock::new(Arc::new(SynthesisOptions::default())),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Builder method: set the synthesis model.
    pub fn with_model(self, model: impl Into<String>) -> Self {
        self.update_options(SynthesisOptionsUpdate {
            model: Some(model.into()),
            ..Default::default()
        });
        self
    }

    /// Builder method: set the voice.
    pub fn with_voice(self, voice: impl Into<String>) -> Self {
        self.update_options(SynthesisOptionsUpdate {
            voice: Some(voice.into()),
            ..Default::default()
        });
        self
    }

    /// Builder method: set the playback speed multiplier.
    pub fn with_speed(self, speed: f64) -> Self {
        self.update_options(SynthesisOptionsUpdate {
            speed: Some(speed),
            ..Default::default()
        });
        self
    }

    /// Builder method: set the encoded audio format.
    pub fn with_response_format(self, format: impl Into<String>) -> Self {
        self.update_options(SynthesisOptionsUpdate {
            response_format: Some(format.into()),
            ..Default::default()
        });
        self
    }

    /// Builder method: set the bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Builder method: set the default per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method: set a custom `reqwest::Client`.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Server base URL the client was built with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current options snapshot.
    ///
    /// The returned `Arc` keeps observing the same values even if the
    /// client is updated afterwards.
    pub fn options(&self) -> Arc<SynthesisOptions> {
        self.options
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply a partial options change.
    ///
    /// The fields that are `Some` replace their current values and the
    /// result becomes the new snapshot in one swap. Synthesis calls already
    /// in flight keep the snapshot they captured.
    pub fn update_options(&self, update: SynthesisOptionsUpdate) {
        let mut guard = self.options.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = SynthesisOptions::clone(guard.as_ref());
        if let Some(model) = update.model {
            next.model = model;
        }
        if let Some(voice) = update.voice {
            next.voice = voice;
        }
        if let Some(speed) = update.speed {
            next.speed = speed;
        }
        if let Some(format) = update.response_format {
            next.response_format = format;
        }
        *guard = Arc::new(next);
    }

    /// Synthesize text with an explicit timeout instead of the default.
    pub async fn synthesize_with_timeout(
        &self,
        text: &str,
        timeout: Duration,
    ) -> Result<SynthesisResult, SpeechError> {
        let opts = self.options();
        let url = format!("{}{}", self.base_url, SPEECH_ENDPOINT);
        let request = SpeechRequest {
            model: &opts.model,
            voice: &opts.voice,
            input: text,
            response_format: &opts.response_format,
            speed: opts.speed,
        };

        info!(
            "SynthesisClient: request (model={}, voice={}, format={}, speed={:.2}): {}",
            opts.model, opts.voice, opts.response_format, opts.speed, text,
        );

        let mut builder = self
            .client
            .post(&url)
            .json(&request)
            .header("Accept", DEFAULT_MIME_TYPE)
            .timeout(timeout);
        if let Some(ref key) = self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await?;
        let status = response.status();
        let request_id = request_id_header(&response);
        let mime_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "SynthesisClient: server error ({}, request_id={})",
                status,
                request_id.as_deref().unwrap_or("-"),
            );
            return Err(SpeechError::Status {
                code: status.as_u16(),
                request_id,
                body,
            });
        }

        let audio = response.bytes().await?.to_vec();
        debug!(
            audio_bytes = audio.len(),
            mime_type = %mime_type,
            "received synthesis audio"
        );

        Ok(SynthesisResult {
            audio,
            mime_type,
            sample_rate: Self::SAMPLE_RATE,
            num_channels: Self::NUM_CHANNELS,
            request_id,
        })
    }
}

impl fmt::Debug for SynthesisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opts = self.options();
        f.debug_struct("SynthesisClient")
            .field("base_url", &self.base_url)
            .field("model", &opts.model)
            .field("voice", &opts.voice)
            .field("speed", &opts.speed)
            .field("response_format", &opts.response_format)
            .field("timeout", &self.timeout)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Trait implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl SpeechService for SynthesisClient {
    fn model(&self) -> Option<String> {
        Some(self.options().model.clone())
    }
}

#[async_trait]
impl SynthesisService for SynthesisClient {
    async fn synthesize(&self, text: &str) -> Result<SynthesisResult, SpeechError> {
        self.synthesize_with_timeout(text, self.timeout).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
