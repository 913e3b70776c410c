// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Minimal WAV container encoding.
//!
//! Transcription uploads are sent as complete WAV files. Only the 44-byte
//! canonical PCM header is ever produced here; the crate carries no other
//! sample format.

const BITS_PER_SAMPLE: u16 = 16;

/// Wrap raw PCM16 data in a WAV container.
///
/// Produces a canonical 44-byte header followed by the payload. Payloads
/// larger than `u32::MAX` bytes are truncated in the declared sizes, which
/// in practice never happens for utterance-sized uploads.
pub fn encode_pcm_to_wav(pcm: &[u8], sample_rate: u32, num_channels: u16) -> Vec<u8> {
    let block_align = num_channels * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    let data_len = pcm.len().min(u32::MAX as usize) as u32;
    let riff_len = data_len.saturating_add(36);

    let mut wav = Vec::with_capacity(44 + pcm.len());

    // RIFF chunk descriptor.
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&riff_len.to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // "fmt " sub-chunk, PCM layout.
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes());
    wav.extend_from_slice(&1u16.to_le_bytes());
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // "data" sub-chunk.
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_len.to_le_bytes());
    wav.extend_from_slice(pcm);

    wav
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    #[test]
    fn test_wav_header_layout() {
        let pcm = vec![0u8; 3200];
        let wav = encode_pcm_to_wav(&pcm, 16000, 1);

        assert_eq!(wav.len(), 44 + 3200);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(read_u32_le(&wav, 4), 3200 + 36);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(read_u32_le(&wav, 16), 16); // PCM fmt chunk size
        assert_eq!(read_u16_le(&wav, 20), 1); // PCM format tag
        assert_eq!(read_u16_le(&wav, 22), 1); // channels
        assert_eq!(read_u32_le(&wav, 24), 16000); // sample rate
        assert_eq!(read_u32_le(&wav, 28), 32000); // byte rate
        assert_eq!(read_u16_le(&wav, 32), 2); // block align
        assert_eq!(read_u16_le(&wav, 34), 16); // bits per sample
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(read_u32_le(&wav, 40), 3200);
    }

    #[test]
    fn test_wav_stereo_rates() {
        let wav = encode_pcm_to_wav(&[], 24000, 2);
        assert_eq!(read_u16_le(&wav, 22), 2);
        assert_eq!(read_u32_le(&wav, 28), 96000); // 24000 * 2 ch * 2 bytes
        assert_eq!(read_u16_le(&wav, 32), 4);
        assert_eq!(read_u32_le(&wav, 40), 0);
    }

    #[test]
    fn test_wav_payload_follows_header() {
        let pcm = [1u8, 2, 3, 4];
        let wav = encode_pcm_to_wav(&pcm, 16000, 1);
        assert_eq!(&wav[44..], &pcm);
    }
}
