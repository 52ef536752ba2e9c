//! Audio decoding and resampling to a fixed-rate mono waveform.

use std::io::Cursor;
use std::path::Path;

use seedscout_core::Waveform;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::errors::{AudioError, Result, ResultExt};

/// Sample rate every waveform is converted to unless configured otherwise.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// File extensions accepted as local audio.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a"];

/// Decode audio bytes into mono samples at `target_rate`.
///
/// `hint` is a file extension (`"mp3"`) or MIME type (`"audio/mpeg"`) that
/// speeds up format probing; `None` probes blindly. Multi-channel audio is
/// averaged to mono, then resampled when the source rate differs.
pub fn decode_audio(data: &[u8], hint: Option<&str>, target_rate: u32) -> Result<Waveform> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut probe_hint = Hint::new();
    if let Some(ext) = hint.and_then(extension_for) {
        let _ = probe_hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &probe_hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .decode("probe failed")?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("no audio track found".into()))?;

    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    let source_rate = codec_params.sample_rate.unwrap_or(target_rate);

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .decode("codec init failed")?;

    let mut mono: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(AudioError::Decode(format!("packet read: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Corrupt frames are skipped, the stream can continue.
            Err(SymphoniaError::DecodeError(e)) => {
                debug!(error = e, "skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(AudioError::Decode(format!("decode: {e}"))),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        mix_to_mono(sample_buf.samples(), channels, &mut mono);
    }

    if mono.is_empty() {
        return Err(AudioError::Decode("no audio samples decoded".into()));
    }

    let samples = if source_rate == target_rate {
        mono
    } else {
        resample(&mono, source_rate, target_rate)?
    };

    debug!(
        source_rate,
        target_rate,
        samples = samples.len(),
        "decoded audio"
    );
    Ok(Waveform::new(samples, target_rate))
}

/// Read and decode a local audio file, using its extension as the probe hint.
pub fn decode_file(path: &Path, target_rate: u32) -> Result<Waveform> {
    let data = std::fs::read(path)?;
    let ext = path.extension().and_then(|e| e.to_str());
    decode_audio(&data, ext, target_rate)
}

/// Whether `path` has one of [`AUDIO_EXTENSIONS`] (case-insensitive).
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| AUDIO_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(e)))
}

/// Map a MIME type or extension to the extension symphonia expects.
fn extension_for(hint: &str) -> Option<&'static str> {
    match hint.to_ascii_lowercase().as_str() {
        "mp3" | "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "wav" | "wave" | "audio/wav" | "audio/wave" | "audio/x-wav" => Some("wav"),
        "m4a" | "mp4" | "aac" | "audio/m4a" | "audio/mp4" | "audio/x-m4a" | "audio/aac" => {
            Some("m4a")
        }
        _ => None,
    }
}

/// Append the channel average of each interleaved frame to `out`.
fn mix_to_mono(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels == 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

/// Resample mono audio from `from_rate` to `to_rate` using rubato.
///
/// The output is trimmed to `ceil(len · to_rate / from_rate)` samples.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    use rubato::{
        Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
    };

    if from_rate == 0 || to_rate == 0 {
        return Err(AudioError::Resample(format!(
            "invalid rates {from_rate} -> {to_rate}"
        )));
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = f64::from(to_rate) / f64::from(from_rate);
    let chunk_size = 1024;

    let mut resampler =
        SincFixedIn::<f32>::new(ratio, 2.0, params, chunk_size, 1).resample("init")?;

    let expected = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(expected + chunk_size);

    for chunk in samples.chunks(chunk_size) {
        let mut input = chunk.to_vec();
        // Pad last chunk with zeros
        input.resize(chunk_size, 0.0);

        let resampled = resampler.process(&[input], None).resample("process")?;
        if let Some(channel) = resampled.first() {
            output.extend_from_slice(channel);
        }
    }

    output.truncate(expected);
    Ok(output)
}
