//! Decode pipeline (C2): produce interleaved stereo + mono float32 PCM
//! either via an in-process WAV parse or by delegating to an `ffmpeg` child
//! process. See spec.md §4.2.

mod ffmpeg;
mod wav;

use crate::error::{Error, Result};

/// Decoded audio, held entirely in memory as described in spec.md §3.2.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    pub mono_samples: Vec<f32>,
    pub mono_rate: u32,
    pub left_samples: Vec<f32>,
    pub right_samples: Vec<f32>,
    pub stereo_rate: u32,
    pub duration_ms: i64,
}

impl DecodedAudio {
    fn from_stereo(left: Vec<f32>, right: Vec<f32>, rate: u32) -> Self {
        let mono_samples: Vec<f32> = left
            .iter()
            .zip(right.iter())
            .map(|(&l, &r)| 0.5 * (l + r))
            .collect();
        let n = left.len();
        let duration_ms = duration_ms_from_frames(n, rate);

        Self {
            mono_samples,
            mono_rate: rate,
            left_samples: left,
            right_samples: right,
            stereo_rate: rate,
            duration_ms,
        }
    }
}

/// `duration_ms = floor(frame_count * 1000 / rate)`, clamped to >= 1.
pub(crate) fn duration_ms_from_frames(frame_count: usize, rate: u32) -> i64 {
    if rate == 0 {
        return 1;
    }
    let ms = (frame_count as u64 * 1000) / rate as u64;
    ms.max(1) as i64
}

/// Dispatch policy (spec.md §4.2.3):
///
/// 1. Try the native WAV path unconditionally.
/// 2. If it fails and the path extension is `.wav`/`.wave`, return failure —
///    WAV files never silently escalate to ffmpeg.
/// 3. Otherwise invoke the ffmpeg path exactly once.
pub fn decode_audio_file(track_path: &str) -> Result<DecodedAudio> {
    match wav::decode_wav_file(track_path) {
        Ok(audio) => Ok(audio),
        Err(wav_err) => {
            if is_forced_wav_extension(track_path) {
                tracing::debug!(track_path, error = %wav_err, "wav decode failed for .wav/.wave path");
                Err(Error::analysis(format!("wav decode: {wav_err}")))
            } else {
                tracing::debug!(track_path, error = %wav_err, "wav decode failed, falling back to ffmpeg");
                ffmpeg::decode_with_ffmpeg(track_path)
            }
        }
    }
}

fn is_forced_wav_extension(track_path: &str) -> bool {
    let lower = track_path.to_ascii_lowercase();
    lower.ends_with(".wav") || lower.ends_with(".wave")
}
