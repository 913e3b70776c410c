// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Voicebridge - Voice-agent building blocks for self-hosted speech servers.
//!
//! Voicebridge provides the pieces a real-time voice agent needs between the
//! transport and the language model: an energy-based voice activity detector
//! that turns raw PCM frames into speech segments, HTTP adapters for
//! OpenAI-compatible transcription and synthesis endpoints, and a registry
//! that tracks live conversation sessions.

pub mod audio;
pub mod config;
pub mod error;
pub mod prelude;
pub mod services;
pub mod session;
pub mod utils;
