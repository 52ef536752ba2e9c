//! # seedscout-audio
//!
//! Turns preview clips and local seed files into fixed-rate mono waveforms.
//!
//! - [`decode_audio`] / [`decode_file`]: symphonia decode (mp3, wav, m4a),
//!   mono mix, rubato resample (48 kHz by default)
//! - [`AudioFetcher`]: download a preview URL and decode it off the async runtime
//! - [`wav`]: PCM WAV encoding for decoded-audio artifacts

#![deny(unsafe_code)]

pub mod decode;
pub mod errors;
pub mod fetch;
pub mod wav;

pub use decode::{AUDIO_EXTENSIONS, DEFAULT_SAMPLE_RATE, decode_audio, decode_file, is_audio_file};
pub use errors::{AudioError, Result, ResultExt};
pub use fetch::{AudioFetcher, FetchConfig};
pub use wav::{encode_wav, write_wav};
