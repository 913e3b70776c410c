// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Energy-based voice activity detection.
//!
//! [`EnergyVAD`] classifies each incoming frame by its peak absolute
//! amplitude against a fixed threshold and applies timing hysteresis on top:
//! above-threshold frames must accumulate for `min_speech_duration` seconds
//! before a start is confirmed, and a confirmed segment closes only after
//! `silence_timeout` seconds of below-threshold audio. Candidate frames are
//! retained across sub-threshold dips, so a short pause neither resets an
//! unconfirmed run nor splits a confirmed one.

use std::fmt;

use crate::audio::frame::{AudioFrame, SpeechSegment};
use crate::audio::utils::calculate_peak_amplitude;
use crate::audio::vad::{VADParams, VADState, VoiceActivityEvent, VoiceActivityKind};
use crate::utils::helpers::current_timestamp;

/// Energy-threshold voice activity detector.
///
/// Feed frames in arrival order with [`process_frame`](Self::process_frame)
/// and call [`flush`](Self::flush) when the input stream ends so a
/// still-open segment is closed. The detector is synchronous and
/// single-stream; use one instance per audio source.
pub struct EnergyVAD {
    params: VADParams,
    /// Candidate frames seen above threshold before a start is confirmed.
    pending_frames: Vec<AudioFrame>,
    /// Total duration in seconds of `pending_frames`.
    pending_duration: f64,
    /// The open segment while speaking.
    segment: SpeechSegment,
    /// Below-threshold seconds accumulated while speaking.
    silence_accumulated: f64,
    speech_started: bool,
    /// Per-channel samples seen across all processed frames.
    samples_index: u64,
}

impl EnergyVAD {
    /// Create a detector with the given parameters.
    pub fn new(params: VADParams) -> Self {
        Self {
            params,
            pending_frames: Vec::new(),
            pending_duration: 0.0,
            segment: SpeechSegment::default(),
            silence_accumulated: 0.0,
            speech_started: false,
            samples_index: 0,
        }
    }

    /// Return the current detector state.
    pub fn state(&self) -> VADState {
        if self.speech_started {
            VADState::Speaking
        } else if self.pending_frames.is_empty() {
            VADState::Idle
        } else {
            VADState::Accumulating
        }
    }

    /// Return a reference to the current parameters.
    pub fn params(&self) -> &VADParams {
        &self.params
    }

    /// Per-channel samples consumed so far.
    pub fn samples_index(&self) -> u64 {
        self.samples_index
    }

    /// Replace the detection parameters and reset the detector.
    ///
    /// Timing thresholds change meaning under new parameters, so any open
    /// segment and candidate run are discarded along with the stream
    /// sample position.
    pub fn update_params(&mut self, params: VADParams) {
        self.params = params;
        self.reset();
    }

    /// Feed one frame and advance the detector.
    ///
    /// Returns a [`VoiceActivityKind::StartOfSpeech`] event on the frame
    /// whose arrival satisfies the minimum speech duration, and a
    /// [`VoiceActivityKind::EndOfSpeech`] event on the frame whose silence
    /// crosses the timeout. Every other frame returns `None`.
    pub fn process_frame(&mut self, frame: &AudioFrame) -> Option<VoiceActivityEvent> {
        let amplitude = calculate_peak_amplitude(&frame.data);
        let duration = frame.duration();
        let mut event = None;
        let mut silence_exceeded = false;

        if amplitude >= self.params.threshold {
            self.silence_accumulated = 0.0;
            if self.speech_started {
                self.segment.push(frame.clone());
            } else {
                self.pending_frames.push(frame.clone());
                self.pending_duration += duration;
                if self.pending_duration >= self.params.min_speech_duration {
                    event = Some(self.confirm_start());
                }
            }
        } else if self.speech_started {
            self.silence_accumulated += duration;
            if self.silence_accumulated >= self.params.silence_timeout {
                silence_exceeded = true;
            }
        }

        self.samples_index += u64::from(frame.samples_per_channel);

        if silence_exceeded {
            event = self.close_segment();
        }

        event
    }

    /// Close an open segment at a stream boundary.
    ///
    /// Returns the final [`VoiceActivityKind::EndOfSpeech`] event if a
    /// segment was open, `None` otherwise. Candidate frames that have not
    /// yet confirmed a start are left in place so detection can resume if
    /// more audio follows.
    pub fn flush(&mut self) -> Option<VoiceActivityEvent> {
        self.close_segment()
    }

    /// Reset to [`VADState::Idle`], dropping any open segment, all candidate
    /// frames, and the stream sample position.
    pub fn reset(&mut self) {
        self.pending_frames.clear();
        self.pending_duration = 0.0;
        self.segment = SpeechSegment::default();
        self.silence_accumulated = 0.0;
        self.speech_started = false;
        self.samples_index = 0;
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Fold the candidate frames into a confirmed segment and build the
    /// start event.
    ///
    /// The segment's start index is the stream position of the confirming
    /// frame, which has not been added to `samples_index` yet.
    fn confirm_start(&mut self) -> VoiceActivityEvent {
        self.speech_started = true;
        self.segment = SpeechSegment {
            frames: std::mem::take(&mut self.pending_frames),
            start_index: self.samples_index,
            duration: self.pending_duration,
        };
        self.pending_duration = 0.0;

        VoiceActivityEvent {
            kind: VoiceActivityKind::StartOfSpeech,
            samples_index: self.segment.start_index,
            timestamp: current_timestamp(),
            speech_duration: 0.0,
            silence_duration: 0.0,
            frames: self.segment.frames.clone(),
        }
    }

    /// Emit the end event for an open segment and return to idle.
    fn close_segment(&mut self) -> Option<VoiceActivityEvent> {
        if !self.speech_started {
            return None;
        }

        let segment = std::mem::take(&mut self.segment);
        let event = VoiceActivityEvent {
            kind: VoiceActivityKind::EndOfSpeech,
            samples_index: segment.start_index,
            timestamp: current_timestamp(),
            speech_duration: segment.duration,
            silence_duration: self.silence_accumulated,
            frames: segment.frames,
        };

        self.speech_started = false;
        self.silence_accumulated = 0.0;
        self.pending_frames.clear();
        self.pending_duration = 0.0;

        Some(event)
    }
}

impl Default for EnergyVAD {
    fn default() -> Self {
        Self::new(VADParams::default())
    }
}

impl fmt::Debug for EnergyVAD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnergyVAD")
            .field("state", &self.state())
            .field("params", &self.params)
            .field("pending_frames", &self.pending_frames.len())
            .field("segment_frames", &self.segment.num_frames())
            .field("samples_index", &self.samples_index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: a 16 kHz mono frame of `samples` constant-amplitude samples.
    fn make_frame(samples: u32, amplitude: i16) -> AudioFrame {
        let mut data = Vec::with_capacity(samples as usize * 2);
        for _ in 0..samples {
            data.extend_from_slice(&amplitude.to_le_bytes());
        }
        AudioFrame::new(data, 16000, 1)
    }

    /// 50 ms of audio at 16 kHz.
    fn loud_frame() -> AudioFrame {
        make_frame(800, 800)
    }

    fn silent_frame() -> AudioFrame {
        make_frame(800, 0)
    }

    #[test]
    fn test_new_starts_idle() {
        let vad = EnergyVAD::default();
        assert_eq!(vad.state(), VADState::Idle);
        assert_eq!(vad.samples_index(), 0);
    }

    #[test]
    fn test_silence_never_starts() {
        let mut vad = EnergyVAD::default();
        for _ in 0..5 {
            assert!(vad.process_frame(&silent_frame()).is_none());
        }
        assert_eq!(vad.state(), VADState::Idle);
        assert_eq!(vad.samples_index(), 4000);
    }

    #[test]
    fn test_short_burst_only_accumulates() {
        let mut vad = EnergyVAD::default();
        assert!(vad.process_frame(&loud_frame()).is_none());
        assert_eq!(vad.state(), VADState::Accumulating);
    }

    #[test]
    fn test_start_confirmed_at_min_speech_duration() {
        let mut vad = EnergyVAD::default();
        assert!(vad.process_frame(&loud_frame()).is_none());

        let event = vad.process_frame(&loud_frame());
        let event = event.as_ref().unwrap();
        assert_eq!(event.kind, VoiceActivityKind::StartOfSpeech);
        // Position of the confirming frame, not of the first candidate.
        assert_eq!(event.samples_index, 800);
        assert_eq!(event.speech_duration, 0.0);
        assert_eq!(event.silence_duration, 0.0);
        assert_eq!(event.frames.len(), 2);
        assert!(event.timestamp > 0.0);
        assert_eq!(vad.state(), VADState::Speaking);
    }

    #[test]
    fn test_candidates_survive_sub_threshold_dip() {
        let mut vad = EnergyVAD::default();
        assert!(vad.process_frame(&loud_frame()).is_none());
        assert!(vad.process_frame(&silent_frame()).is_none());
        assert_eq!(vad.state(), VADState::Accumulating);

        let event = vad.process_frame(&loud_frame());
        let event = event.as_ref().unwrap();
        assert_eq!(event.kind, VoiceActivityKind::StartOfSpeech);
        // The silent frame advanced the stream but is not part of the run.
        assert_eq!(event.samples_index, 1600);
        assert_eq!(event.frames.len(), 2);
    }

    #[test]
    fn test_end_after_silence_timeout() {
        let mut vad = EnergyVAD::default();
        vad.process_frame(&loud_frame());
        vad.process_frame(&loud_frame());
        assert_eq!(vad.state(), VADState::Speaking);

        // 0.35 s of silence at 50 ms per frame lands on the 7th frame.
        for _ in 0..6 {
            assert!(vad.process_frame(&silent_frame()).is_none());
        }
        let event = vad.process_frame(&silent_frame());
        let event = event.as_ref().unwrap();
        assert_eq!(event.kind, VoiceActivityKind::EndOfSpeech);
        assert_eq!(event.samples_index, 800);
        assert!((event.speech_duration - 0.1).abs() < 1e-9);
        assert!(event.silence_duration >= 0.35);
        assert_eq!(event.frames.len(), 2);
        assert_eq!(vad.state(), VADState::Idle);
    }

    #[test]
    fn test_loud_frame_resets_silence_accumulation() {
        let mut vad = EnergyVAD::default();
        vad.process_frame(&loud_frame());
        vad.process_frame(&loud_frame());

        // 0.30 s of silence, then speech again before the timeout.
        for _ in 0..6 {
            assert!(vad.process_frame(&silent_frame()).is_none());
        }
        assert!(vad.process_frame(&loud_frame()).is_none());
        assert_eq!(vad.state(), VADState::Speaking);

        // The timeout clock restarts from zero.
        for _ in 0..6 {
            assert!(vad.process_frame(&silent_frame()).is_none());
        }
        let event = vad.process_frame(&silent_frame());
        let event = event.as_ref().unwrap();
        assert_eq!(event.kind, VoiceActivityKind::EndOfSpeech);
        // Three loud frames made it into the segment.
        assert_eq!(event.frames.len(), 3);
        assert!((event.speech_duration - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_flush_closes_open_segment() {
        let mut vad = EnergyVAD::default();
        vad.process_frame(&loud_frame());
        vad.process_frame(&loud_frame());

        let event = vad.flush();
        let event = event.as_ref().unwrap();
        assert_eq!(event.kind, VoiceActivityKind::EndOfSpeech);
        assert_eq!(event.samples_index, 800);
        assert_eq!(event.silence_duration, 0.0);
        assert!((event.speech_duration - 0.1).abs() < 1e-9);

        assert!(vad.flush().is_none());
        assert_eq!(vad.state(), VADState::Idle);
    }

    #[test]
    fn test_flush_keeps_unconfirmed_candidates() {
        let mut vad = EnergyVAD::default();
        assert!(vad.process_frame(&loud_frame()).is_none());
        assert!(vad.flush().is_none());
        assert_eq!(vad.state(), VADState::Accumulating);

        // The retained candidate still counts towards the start.
        let event = vad.process_frame(&loud_frame());
        assert_eq!(
            event.as_ref().unwrap().kind,
            VoiceActivityKind::StartOfSpeech
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut vad = EnergyVAD::default();
        vad.process_frame(&loud_frame());
        vad.process_frame(&loud_frame());
        assert_eq!(vad.state(), VADState::Speaking);

        vad.reset();
        assert_eq!(vad.state(), VADState::Idle);
        assert_eq!(vad.samples_index(), 0);
        assert!(vad.flush().is_none());
    }

    #[test]
    fn test_update_params_resets_and_applies() {
        let mut vad = EnergyVAD::default();
        vad.process_frame(&loud_frame());
        vad.process_frame(&loud_frame());
        assert_eq!(vad.state(), VADState::Speaking);

        vad.update_params(VADParams {
            threshold: 2000,
            ..VADParams::default()
        });
        assert_eq!(vad.state(), VADState::Idle);
        assert_eq!(vad.samples_index(), 0);
        assert_eq!(vad.params().threshold, 2000);

        // Amplitude 800 is below the raised threshold.
        assert!(vad.process_frame(&loud_frame()).is_none());
        assert_eq!(vad.state(), VADState::Idle);
    }

    #[test]
    fn test_zero_min_speech_starts_immediately() {
        let mut vad = EnergyVAD::new(VADParams {
            min_speech_duration: 0.0,
            ..VADParams::default()
        });

        let event = vad.process_frame(&loud_frame());
        let event = event.as_ref().unwrap();
        assert_eq!(event.kind, VoiceActivityKind::StartOfSpeech);
        assert_eq!(event.samples_index, 0);
        assert_eq!(event.frames.len(), 1);
    }

    #[test]
    fn test_debug_omits_frame_payloads() {
        let mut vad = EnergyVAD::default();
        vad.process_frame(&loud_frame());
        let rendered = format!("{vad:?}");
        assert!(rendered.contains("Accumulating"));
        assert!(rendered.contains("pending_frames: 1"));
    }
}
