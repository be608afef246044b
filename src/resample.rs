//! Mono resampler (C3): downsample-only nearest-sample decimation. See
//! spec.md §4.3.
//!
//! This never upsamples and never low-pass filters; it is a cheap
//! decimator suitable for spectrogram input, where the bands of interest
//! sit well below the post-downsample Nyquist. Only `mono_samples` and
//! `mono_rate` are touched — `duration_ms` is derived once at decode time
//! from the stereo buffer (spec.md §3.2, §8.1 invariant 2) and is not
//! recomputed here, since the response's duration contract is pinned to
//! the stereo source regardless of what the mono analysis buffer does
//! downstream.

use crate::decode::DecodedAudio;

/// Downsample `audio.mono_samples` to `target_rate_hz`, in place.
///
/// No-op (and always succeeds) when `target_rate_hz <= 0`, the mono buffer
/// is empty, or `mono_rate <= target_rate_hz`.
pub fn resample_mono(audio: &mut DecodedAudio, target_rate_hz: i64) {
    if target_rate_hz <= 0 {
        return;
    }
    if audio.mono_samples.is_empty() {
        return;
    }
    if (audio.mono_rate as i64) <= target_rate_hz {
        return;
    }

    let step = audio.mono_rate as f64 / target_rate_hz as f64;
    let n = audio.mono_samples.len();
    let capacity = (n as f64 / step).ceil() as usize + 2;
    let mut out = Vec::with_capacity(capacity);

    let mut idx = 0.0f64;
    while (idx.floor() as usize) < n {
        out.push(audio.mono_samples[idx.floor() as usize]);
        idx += step;
    }

    audio.mono_samples = out;
    audio.mono_rate = target_rate_hz as u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio_with_mono(samples: Vec<f32>, rate: u32) -> DecodedAudio {
        DecodedAudio {
            mono_samples: samples,
            mono_rate: rate,
            left_samples: Vec::new(),
            right_samples: Vec::new(),
            stereo_rate: rate,
            duration_ms: 1,
        }
    }

    #[test]
    fn is_noop_for_nonpositive_target() {
        let mut audio = audio_with_mono(vec![1.0, 2.0, 3.0], 44_100);
        resample_mono(&mut audio, 0);
        assert_eq!(audio.mono_samples, vec![1.0, 2.0, 3.0]);
        assert_eq!(audio.mono_rate, 44_100);
    }

    #[test]
    fn is_noop_when_target_exceeds_source_rate() {
        let mut audio = audio_with_mono(vec![1.0, 2.0], 11_025);
        resample_mono(&mut audio, 44_100);
        assert_eq!(audio.mono_rate, 11_025);
        assert_eq!(audio.mono_samples.len(), 2);
    }

    #[test]
    fn is_noop_for_empty_buffer() {
        let mut audio = audio_with_mono(Vec::new(), 44_100);
        resample_mono(&mut audio, 11_025);
        assert!(audio.mono_samples.is_empty());
        assert_eq!(audio.mono_rate, 44_100);
    }

    #[test]
    fn downsamples_by_nearest_stride() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let mut audio = audio_with_mono(samples, 100);
        resample_mono(&mut audio, 25);
        assert_eq!(audio.mono_rate, 25);
        // step = 4.0, so picks indices 0, 4, 8, ...
        assert_eq!(audio.mono_samples, vec![0.0, 4.0, 8.0, 12.0, 16.0, 20.0, 24.0, 28.0, 32.0, 36.0, 40.0, 44.0, 48.0, 52.0, 56.0, 60.0, 64.0, 68.0, 72.0, 76.0, 80.0, 84.0, 88.0, 92.0, 96.0]);
    }

    #[test]
    fn non_integer_stride_rounds_down_per_step() {
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let mut audio = audio_with_mono(samples, 10);
        resample_mono(&mut audio, 3);
        // step = 10/3 ~= 3.333 -> indices 0, 3, 6, 9
        assert_eq!(audio.mono_samples, vec![0.0, 3.0, 6.0, 9.0]);
    }
}
