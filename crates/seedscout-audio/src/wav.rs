//! 16-bit PCM WAV encoding for decoded-audio artifacts.

use std::path::Path;

use seedscout_core::Waveform;

use crate::errors::Result;

const BITS_PER_SAMPLE: u16 = 16;

/// Encode mono samples as a 16-bit PCM WAV file.
///
/// With `channels > 1` every sample is duplicated into each channel.
/// Samples are clamped to `[-1, 1]`.
pub fn encode_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
    let channels = channels.max(1);
    let block_align = channels * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    let data_size = samples.len() as u32 * u32::from(block_align);
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(file_size as usize + 8);
    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &s in samples {
        let pcm = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        for _ in 0..channels {
            buf.extend_from_slice(&pcm.to_le_bytes());
        }
    }
    buf
}

/// Write a waveform to `path` as mono 16-bit PCM.
pub fn write_wav(path: &Path, waveform: &Waveform) -> Result<()> {
    std::fs::write(path, encode_wav(&waveform.samples, waveform.sample_rate, 1))?;
    Ok(())
}
