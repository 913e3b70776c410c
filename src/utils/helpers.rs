// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Shared timestamp helpers.

use std::time::SystemTime;

/// Current wall-clock time as fractional seconds since the Unix epoch.
///
/// Used to stamp voice activity events. Returns `0.0` if the system
/// clock is before the epoch.
pub fn current_timestamp() -> f64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Format a [`SystemTime`] as a compact "SECONDS.MILLISZ" string.
pub fn format_timestamp(ts: SystemTime) -> String {
    let duration = ts
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:03}Z", duration.as_secs(), duration.subsec_millis())
}
