// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Speech-server transcription adapter.
//!
//! Provides batch speech recognition against a speech server exposing
//! `POST /v1/audio/transcriptions`. Frames are merged into a single WAV
//! upload per request; the endpoint is **not** streaming, so callers hand
//! over one complete utterance at a time (typically the frames attached to
//! an end-of-speech event).
//!
//! Backends behind this endpoint disagree on their response shape, so the
//! transcript and language are recovered by walking the parsed JSON rather
//! than by binding to one fixed schema. Plain-text responses are used
//! verbatim.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::audio::frame::AudioFrame;
use crate::error::SpeechError;
use crate::services::shared::multipart::MultipartForm;
use crate::services::shared::request_id_header;
use crate::services::shared::wav::encode_pcm_to_wav;
use crate::services::{RecognitionService, SpeechService};

/// Transcription endpoint path, relative to the server base URL.
const TRANSCRIPTIONS_ENDPOINT: &str = "/v1/audio/transcriptions";

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// Result of one transcription request.
#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    /// Recognized text, trimmed. Empty when the backend heard nothing;
    /// that is a valid outcome, not an error.
    pub transcript: String,
    /// Detected language if the backend reported one, otherwise the
    /// configured language, otherwise the caller's hint, otherwise empty.
    pub language_code: String,
    /// Duration in seconds of the uploaded audio.
    pub audio_duration: f64,
    /// Parsed response payload when the body was JSON.
    pub raw_response: Option<Value>,
    /// Backend request id from the `x-request-id` header.
    pub request_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Response field extraction
// ---------------------------------------------------------------------------

/// Keys whose direct string value is taken as the transcript.
const TRANSCRIPT_KEYS: [&str; 5] = ["text", "transcript", "transcription", "result", "output"];

/// Keys whose direct string value is taken as the language.
const LANGUAGE_KEYS: [&str; 3] = ["language", "lang", "detected_language"];

/// Keys whose array value is searched recursively.
const NESTED_LIST_KEYS: [&str; 3] = ["segments", "alternatives", "data"];

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Recover the transcript from an arbitrary response payload.
///
/// Strings are taken directly, arrays yield their first hit, and objects
/// are probed by well-known keys: direct string values first, then nested
/// arrays of segments or alternatives. A nested key holding anything other
/// than an array is ignored.
fn extract_transcript(body: &Value) -> Option<String> {
    match body {
        Value::String(text) => non_empty(text),
        Value::Array(items) => items.iter().find_map(extract_transcript),
        Value::Object(map) => {
            for key in TRANSCRIPT_KEYS {
                if let Some(Value::String(text)) = map.get(key) {
                    if let Some(found) = non_empty(text) {
                        return Some(found);
                    }
                }
            }
            for key in NESTED_LIST_KEYS {
                if let Some(Value::Array(items)) = map.get(key) {
                    if let Some(found) = items.iter().find_map(extract_transcript) {
                        return Some(found);
                    }
                }
            }
            None
        }
        _ => None,
    }
}

/// Recover the reported language from a response payload.
///
/// Unlike [`extract_transcript`] this only ever starts from an object;
/// a bare string body carries no language information.
fn extract_language(body: &Value) -> Option<String> {
    match body {
        Value::Object(map) => {
            for key in LANGUAGE_KEYS {
                if let Some(Value::String(text)) = map.get(key) {
                    if let Some(found) = non_empty(text) {
                        return Some(found);
                    }
                }
            }
            for key in NESTED_LIST_KEYS {
                if let Some(Value::Array(items)) = map.get(key) {
                    if let Some(found) = items.iter().find_map(extract_language) {
                        return Some(found);
                    }
                }
            }
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// TranscriptionClient
// ---------------------------------------------------------------------------

/// Speech-server batch transcription client.
///
/// # Example
///
/// ```rust,no_run
/// use voicebridge::services::stt::TranscriptionClient;
///
/// let stt = TranscriptionClient::new("http://localhost:8000")
///     .with_model("Systran/faster-whisper-medium")
///     .with_language("en");
/// ```
pub struct TranscriptionClient {
    /// Server base URL without trailing slash.
    base_url: String,
    /// Optional bearer token.
    api_key: Option<String>,
    /// Model identifier sent with every request.
    model: String,
    /// Fixed language. When set, per-call hints are ignored.
    language: Option<String>,
    /// Response format requested from the server.
    response_format: String,
    /// Default per-request timeout.
    timeout: Duration,
    /// HTTP client for API requests.
    client: reqwest::Client,
}

impl TranscriptionClient {
    /// Default transcription model.
    pub const DEFAULT_MODEL: &'static str = "Systran/faster-whisper-medium";

    /// Default response format.
    pub const DEFAULT_RESPONSE_FORMAT: &'static str = "json";

    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client for the given server base URL.
    ///
    /// A trailing slash on `base_url` is stripped so endpoint paths can be
    /// appended verbatim.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            model: Self::DEFAULT_MODEL.to_string(),
            language: None,
            response_format: Self::DEFAULT_RESPONSE_FORMAT.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Builder method: set the transcription model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder method: pin the transcription language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builder method: set the response format.
    pub fn with_response_format(mut self, format: impl Into<String>) -> Self {
        self.response_format = format.into();
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

    /// Transcribe frames with an explicit timeout instead of the default.
    pub async fn recognize_with_timeout(
        &self,
        frames: &[AudioFrame],
        language_hint: Option<&str>,
        timeout: Duration,
    ) -> Result<TranscriptionResult, SpeechError> {
        let first = match frames.first() {
            Some(frame) => frame,
            None => {
                warn!("TranscriptionClient: no audio frames to transcribe");
                return Err(SpeechError::EmptyAudio);
            }
        };

        let pcm = merge_frame_data(frames);
        if pcm.is_empty() {
            warn!("TranscriptionClient: audio frames carry no samples");
            return Err(SpeechError::EmptyAudio);
        }

        let audio_duration: f64 = frames.iter().map(AudioFrame::duration).sum();
        let wav = encode_pcm_to_wav(&pcm, first.sample_rate, first.num_channels);
        let (content_type, body) = self.build_form(&wav, language_hint);
        let url = format!("{}{}", self.base_url, TRANSCRIPTIONS_ENDPOINT);

        debug!(
            model = %self.model,
            duration_secs = format_args!("{audio_duration:.2}"),
            upload_bytes = body.len(),
            "sending transcription request"
        );

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", content_type)
            .header("Accept", "application/json")
            .timeout(timeout)
            .body(body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await?;
        let status = response.status();
        let request_id = request_id_header(&response);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "TranscriptionClient: server error ({}, request_id={})",
                status,
                request_id.as_deref().unwrap_or("-"),
            );
            return Err(SpeechError::Status {
                code: status.as_u16(),
                request_id,
                body,
            });
        }

        let text = response.text().await?;
        let (transcript, detected_language, raw_response) =
            match serde_json::from_str::<Value>(&text) {
                Ok(body) => {
                    let transcript = extract_transcript(&body).unwrap_or_default();
                    let detected = extract_language(&body);
                    (transcript, detected, Some(body))
                }
                Err(_) => (text.trim().to_string(), None, None),
            };

        let language_code = detected_language
            .or_else(|| self.language.clone())
            .or_else(|| language_hint.and_then(non_empty))
            .unwrap_or_default();
        let language_label = if language_code.is_empty() {
            "unknown"
        } else {
            language_code.as_str()
        };

        if transcript.is_empty() {
            debug!(
                "TranscriptionClient: empty transcript (duration={audio_duration:.2}s, language={language_label})"
            );
        } else {
            info!(
                "TranscriptionClient: transcript (duration={audio_duration:.2}s, language={language_label}): {transcript}"
            );
        }

        Ok(TranscriptionResult {
            transcript,
            language_code,
            audio_duration,
            raw_response,
            request_id,
        })
    }

    /// Build the multipart body for one upload.
    ///
    /// Returns `(content_type_header_value, body_bytes)`. The configured
    /// language wins over the caller's hint.
    fn build_form(&self, wav: &[u8], language_hint: Option<&str>) -> (String, Vec<u8>) {
        let mut form = MultipartForm::new("Stt");
        form.add_text("model", &self.model);
        form.add_text("response_format", &self.response_format);
        if let Some(language) = self.language.as_deref().or(language_hint) {
            form.add_text("language", language);
        }
        form.add_file("file", "input.wav", "audio/wav", wav);
        form.finish()
    }
}

/// Concatenate frame payloads for upload, in arrival order.
fn merge_frame_data(frames: &[AudioFrame]) -> Vec<u8> {
    let total: usize = frames.iter().map(|frame| frame.data.len()).sum();
    let mut pcm = Vec::with_capacity(total);
    for frame in frames {
        pcm.extend_from_slice(&frame.data);
    }
    pcm
}

impl fmt::Debug for TranscriptionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptionClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("language", &self.language)
            .field("response_format", &self.response_format)
            .field("timeout", &self.timeout)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Trait implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl SpeechService for TranscriptionClient {
    fn model(&self) -> Option<String> {
        Some(self.model.clone())
    }
}

#[async_trait]
impl RecognitionService for TranscriptionClient {
    async fn recognize(
        &self,
        frames: &[AudioFrame],
        language_hint: Option<&str>,
    ) -> Result<TranscriptionResult, SpeechError> {
        self.recognize_with_timeout(frames, language_hint, self.timeout)
            .await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
