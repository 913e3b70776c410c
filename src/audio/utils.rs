// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Audio analysis helpers for raw PCM data.
//!
//! All functions in this module operate on 16-bit signed little-endian
//! PCM, which is the only sample format the crate carries.

/// Calculate the peak absolute sample amplitude of PCM16 audio data.
///
/// Interprets the byte slice as little-endian 16-bit signed integer samples
/// and returns the largest absolute value found. Buffers shorter than one
/// full sample yield `0`, and a trailing odd byte is ignored rather than
/// treated as a malformed sample.
///
/// # Arguments
///
/// * `pcm_bytes` - Raw audio bytes in PCM16 format (16-bit signed little-endian).
///
/// # Returns
///
/// The peak absolute sample value, in the range `0..=32768`.
pub fn calculate_peak_amplitude(pcm_bytes: &[u8]) -> i32 {
    if pcm_bytes.len() < 2 {
        return 0;
    }

    let num_samples = pcm_bytes.len() / 2;
    let mut peak: i32 = 0;
    for i in 0..num_samples {
        let offset = i * 2;
        let sample = i16::from_le_bytes([pcm_bytes[offset], pcm_bytes[offset + 1]]);
        // unsigned_abs keeps i16::MIN representable (32768 does not fit in i16).
        let magnitude = i32::from(sample.unsigned_abs());
        if magnitude > peak {
            peak = magnitude;
        }
    }

    peak
}

/// Duration in seconds of a PCM16 byte buffer.
///
/// # Arguments
///
/// * `num_bytes` - Length of the PCM data in bytes.
/// * `sample_rate` - Sample rate in Hz.
/// * `num_channels` - Number of interleaved channels.
///
/// # Returns
///
/// Duration in seconds, or `0.0` when the rate or channel count is zero.
pub fn pcm_duration_secs(num_bytes: usize, sample_rate: u32, num_channels: u16) -> f64 {
    let bytes_per_second = sample_rate as f64 * num_channels as f64 * 2.0;
    if bytes_per_second == 0.0 {
        return 0.0;
    }
    num_bytes as f64 / bytes_per_second
}
