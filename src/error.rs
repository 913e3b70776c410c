// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Error types shared by the speech service adapters.
//!
//! The taxonomy mirrors what callers need to dispatch on: transport
//! failures, elapsed deadlines, and non-2xx responses. Recovery policy
//! (retry, fallback voice, user-facing apology) belongs to the caller;
//! the adapters never retry or suppress an error locally.

/// Errors produced by [`TranscriptionClient`](crate::services::stt::TranscriptionClient)
/// and [`SynthesisClient`](crate::services::tts::SynthesisClient).
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    /// Transport-level failure: DNS resolution, connection refused,
    /// connection reset, TLS handshake.
    #[error("connection failed: {source}")]
    Connection {
        #[source]
        source: reqwest::Error,
    },

    /// The request deadline elapsed before a complete response arrived.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("request failed with status {code}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Server-assigned request id from the `x-request-id` header, if any.
        request_id: Option<String>,
        /// Raw response body, useful for diagnostics.
        body: String,
    },

    /// `recognize` was called with no audio frames; a waveform container
    /// cannot be produced without a sample rate.
    #[error("no audio frames to transcribe")]
    EmptyAudio,
}

impl SpeechError {
    /// Return the HTTP status code for [`SpeechError::Status`] errors.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SpeechError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout
        } else {
            Self::Connection { source }
        }
    }
}
