// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Audio frame and speech segment containers.
//!
//! [`AudioFrame`] is the unit of audio moving through the crate: a chunk of
//! 16-bit signed little-endian PCM together with its format. There is no
//! format tag because no other encoding is representable here; producers of
//! other formats must convert before constructing a frame.

/// A chunk of raw PCM16 audio.
///
/// `samples_per_channel` is derived from the payload length at construction
/// time, so a frame always describes exactly the bytes it carries.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// Raw little-endian PCM16 bytes, channel-interleaved.
    pub data: Vec<u8>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub num_channels: u16,
    /// Number of samples per channel carried by `data`.
    pub samples_per_channel: u32,
}

impl AudioFrame {
    /// Create a frame from raw PCM16 bytes.
    ///
    /// A trailing partial sample (odd byte, or an incomplete interleave
    /// group) is not counted towards `samples_per_channel`.
    pub fn new(data: Vec<u8>, sample_rate: u32, num_channels: u16) -> Self {
        let bytes_per_sample_group = usize::from(num_channels) * 2;
        let samples_per_channel = if bytes_per_sample_group == 0 {
            0
        } else {
            (data.len() / bytes_per_sample_group) as u32
        };
        Self {
            data,
            sample_rate,
            num_channels,
            samples_per_channel,
        }
    }

    /// Frame duration in seconds.
    ///
    /// Returns `0.0` when the sample rate is zero, so degenerate frames
    /// never poison downstream duration accounting.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        f64::from(self.samples_per_channel) / f64::from(self.sample_rate)
    }
}

/// An accumulated run of speech frames.
///
/// The voice activity detector fills one of these per utterance; consumers
/// usually hand [`SpeechSegment::merged_pcm`] to a transcription backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeechSegment {
    /// Frames that crossed the energy threshold, in arrival order.
    pub frames: Vec<AudioFrame>,
    /// Stream sample position (per channel) at which the segment was
    /// confirmed.
    pub start_index: u64,
    /// Total duration in seconds of the held frames.
    pub duration: f64,
}

impl SpeechSegment {
    /// Append a frame, extending the tracked duration.
    pub fn push(&mut self, frame: AudioFrame) {
        self.duration += frame.duration();
        self.frames.push(frame);
    }

    /// Number of frames held.
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Whether the segment holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Sample rate of the held audio, taken from the first frame.
    ///
    /// Returns `0` for an empty segment.
    pub fn sample_rate(&self) -> u32 {
        self.frames.first().map_or(0, |frame| frame.sample_rate)
    }

    /// Number of channels of the held audio, taken from the first frame.
    ///
    /// Returns `0` for an empty segment.
    pub fn num_channels(&self) -> u16 {
        self.frames.first().map_or(0, |frame| frame.num_channels)
    }

    /// Concatenate all frame payloads into a single PCM16 buffer.
    pub fn merged_pcm(&self) -> Vec<u8> {
        let total: usize = self.frames.iter().map(|frame| frame.data.len()).sum();
        let mut pcm = Vec::with_capacity(total);
        for frame in &self.frames {
            pcm.extend_from_slice(&frame.data);
        }
        pcm
    }
}
