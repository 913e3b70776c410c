// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Audio subsystem: PCM containers, analysis helpers, and voice activity
//! detection.

pub mod frame;
pub mod utils;
pub mod vad;
