//! Spectrogram (C4a): per-frame log-magnitude bands via a Goertzel bank
//! over a Hann-windowed frame. See spec.md §4.4.

use crate::error::{Error, Result};

/// One spectrogram frame: position in milliseconds plus one byte per band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectrumFrame {
    pub pos_ms: i32,
    pub bands: Vec<u8>,
}

const MIN_FREQ_HZ: f64 = 40.0;
const MAX_FREQ_CEILING_HZ: f64 = 5000.0;
const MIN_WINDOW: usize = 256;
const MAX_WINDOW: usize = 2048;

/// Compute the spectrogram for `mono` at `mono_rate` Hz.
///
/// Fails (per spec.md §4.4 edge cases) when `mono_rate <= 0`, there are no
/// samples, or the resulting frame count is zero — an empty `frames` array
/// is never emitted, it is treated as a DSP failure instead.
pub fn compute_spectrogram(
    mono: &[f32],
    mono_rate: u32,
    hop_ms: i64,
    band_count: i64,
    max_frames: i64,
) -> Result<Vec<SpectrumFrame>> {
    if mono_rate == 0 || mono.is_empty() {
        return Err(Error::analysis("analysis failed (spectrum)"));
    }

    let mono_rate_f = mono_rate as f64;
    let hop_samples = ((mono_rate_f * hop_ms as f64 / 1000.0).round() as i64).max(1) as usize;
    let window_size = next_pow2(hop_samples * 2).clamp(MIN_WINDOW, MAX_WINDOW);
    let band_count = band_count.max(1) as usize;

    let coeffs = band_coefficients(band_count, window_size, mono_rate_f);
    let window = hann_window(window_size);

    let n = mono.len();
    let frame_count = max_frames.min(div_ceil_i64(n as i64, hop_samples as i64)).max(0) as usize;
    if frame_count == 0 {
        return Err(Error::analysis("analysis failed (spectrum)"));
    }

    let mut matrix = vec![0.0f64; frame_count * band_count];
    let mut pos_ms = vec![0i32; frame_count];
    let mut max_mag = 0.0f64;
    let mut x = vec![0.0f64; window_size];

    for f in 0..frame_count {
        let start = f * hop_samples;
        pos_ms[f] = ((start as u64 * 1000) / mono_rate as u64) as i32;

        for i in 0..window_size {
            let sample = mono.get(start + i).copied().unwrap_or(0.0) as f64;
            x[i] = sample * window[i];
        }

        for (b, &coeff) in coeffs.iter().enumerate() {
            let power = goertzel_power(&x, coeff);
            let mag = (power.max(0.0)).ln_1p();
            matrix[f * band_count + b] = mag;
            if mag > max_mag {
                max_mag = mag;
            }
        }
    }

    // All-zero input must not divide by zero; treat max_mag == 0 as 1.0.
    let denom = if max_mag <= 0.0 { 1.0 } else { max_mag };

    let mut frames = Vec::with_capacity(frame_count);
    for f in 0..frame_count {
        let mut bands = Vec::with_capacity(band_count);
        for b in 0..band_count {
            let normalized = (matrix[f * band_count + b] / denom).clamp(0.0, 1.0);
            let curved = normalized.sqrt();
            let byte = (curved * 255.0).round().clamp(0.0, 255.0) as u8;
            bands.push(byte);
        }
        frames.push(SpectrumFrame {
            pos_ms: pos_ms[f],
            bands,
        });
    }

    Ok(frames)
}

/// Per-band Goertzel coefficients over a logarithmically spaced frequency grid.
fn band_coefficients(band_count: usize, window_size: usize, mono_rate: f64) -> Vec<f64> {
    if band_count == 1 {
        return vec![2.0 * (0.0f64).cos()];
    }

    let half = mono_rate / 2.0 - 1.0;
    let nyquist = if half < 100.0 { 100.0 } else { half };
    let max_freq = MAX_FREQ_CEILING_HZ.min(nyquist - 1.0).max(MIN_FREQ_HZ);

    let r = (max_freq / MIN_FREQ_HZ).powf(1.0 / (band_count as f64 - 1.0));

    (0..band_count)
        .map(|b| {
            let freq_b = MIN_FREQ_HZ * r.powi(b as i32);
            let k_b = (window_size as f64 * freq_b / mono_rate).round();
            2.0 * (2.0 * std::f64::consts::PI * k_b / window_size as f64).cos()
        })
        .collect()
}

fn hann_window(window_size: usize) -> Vec<f64> {
    if window_size <= 1 {
        return vec![1.0; window_size];
    }
    (0..window_size)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / (window_size as f64 - 1.0)).cos())
        .collect()
}

fn goertzel_power(x: &[f64], coeff: f64) -> f64 {
    let mut s1 = 0.0;
    let mut s2 = 0.0;
    for &xi in x {
        let s = xi + coeff * s1 - s2;
        s2 = s1;
        s1 = s;
    }
    s2 * s2 + s1 * s1 - coeff * s1 * s2
}

fn next_pow2(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    let mut p = 1usize;
    while p < n {
        p <<= 1;
    }
    p
}

fn div_ceil_i64(a: i64, b: i64) -> i64 {
    if b == 0 {
        return 0;
    }
    (a + b - 1) / b
}
