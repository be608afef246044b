//! Beat / onset timeline (C4b, optional). See spec.md §4.5.
//!
//! A positive-difference spectral-flux surrogate over an RMS energy
//! envelope, with a plain autocorrelation tempo search and phase-locked
//! beat flagging. Intentionally simple — this warms a display/seek cache,
//! it is not studio-grade beat tracking (spec.md §9 Open Question: no
//! harmonic weighting, so the tempo search can lock onto half/double tempo).

/// One beat-timeline frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatFrame {
    pub pos_ms: i32,
    pub strength_u8: u8,
    pub is_beat: bool,
}

/// The beat/onset result: an estimated tempo plus a per-hop strength/flag timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatResult {
    pub bpm: f64,
    pub frames: Vec<BeatFrame>,
}

const TEMPO_MIN_BPM: f64 = 60.0;
const TEMPO_MAX_BPM: f64 = 180.0;
const MIN_FRAMES_FOR_TEMPO: usize = 8;

pub fn compute_beat(mono: &[f32], mono_rate: u32, hop_ms: i64, max_frames: i64) -> BeatResult {
    if mono.is_empty() || mono_rate == 0 {
        return BeatResult { bpm: 0.0, frames: Vec::new() };
    }

    let hop_samples = ((mono_rate as f64 * hop_ms as f64 / 1000.0).round() as i64).max(1) as usize;
    let window_samples = 2 * hop_samples;

    let energy = rms_envelope(mono, hop_samples, window_samples, max_frames);
    let e_count = energy.len();

    let onset = onset_envelope(&energy);
    let strength = strength_series(&onset);

    let (bpm, lag, phase) = if e_count >= MIN_FRAMES_FOR_TEMPO {
        estimate_tempo(&onset, hop_ms, e_count)
    } else {
        (0.0, 0, 0)
    };

    let is_beat = if lag > 0 {
        beat_flags(&strength, lag, phase)
    } else {
        vec![false; e_count]
    };

    let frames = (0..e_count)
        .map(|i| BeatFrame {
            pos_ms: (i as i64 * hop_ms) as i32,
            strength_u8: (strength[i] * 255.0).round().clamp(0.0, 255.0) as u8,
            is_beat: is_beat[i],
        })
        .collect();

    BeatResult { bpm: bpm.max(0.0), frames }
}

fn rms_envelope(mono: &[f32], hop_samples: usize, window_samples: usize, max_frames: i64) -> Vec<f64> {
    let n = mono.len();
    let mut energy = Vec::new();
    let mut start = 0usize;

    while start < n && (energy.len() as i64) < max_frames {
        let end = (start + window_samples).min(n);
        let slice = &mono[start..end];
        let rms = if slice.is_empty() {
            0.0
        } else {
            let sum_sq: f64 = slice.iter().map(|&s| (s as f64) * (s as f64)).sum();
            (sum_sq / slice.len() as f64).sqrt()
        };
        energy.push(rms);
        start += hop_samples;
    }

    energy
}

fn onset_envelope(energy: &[f64]) -> Vec<f64> {
    let mut onset = vec![0.0; energy.len()];
    for i in 1..energy.len() {
        onset[i] = (energy[i] - energy[i - 1]).max(0.0);
    }
    onset
}

fn strength_series(onset: &[f64]) -> Vec<f64> {
    let m = onset.iter().cloned().fold(0.0f64, f64::max);
    if m <= 0.0 {
        return vec![0.0; onset.len()];
    }
    onset.iter().map(|&o| (o / m).clamp(0.0, 1.0)).collect()
}

/// Returns `(bpm, lag, phase)`. `lag == 0` means no tempo was found.
fn estimate_tempo(onset: &[f64], hop_ms: i64, e_count: usize) -> (f64, usize, usize) {
    let fps = 1000.0 / hop_ms as f64;

    let lag_min = ((60.0 * fps / TEMPO_MAX_BPM).round() as i64).max(1) as usize;
    let lag_max_raw = (60.0 * fps / TEMPO_MIN_BPM).round() as i64;
    let lag_max = (lag_max_raw.min(e_count as i64 - 1)) as usize;

    if lag_min as i64 >= lag_max as i64 || lag_max < lag_min + 1 {
        return (0.0, 0, 0);
    }

    let mut best_lag = lag_min;
    let mut best_score = autocorr_score(onset, lag_min);

    for lag in (lag_min + 1)..=lag_max {
        let score = autocorr_score(onset, lag);
        if score > best_score {
            best_score = score;
            best_lag = lag;
        }
    }

    let bpm = 60.0 * fps / best_lag as f64;

    let phase = phase_winner(onset, best_lag);
    (bpm, best_lag, phase)
}

fn autocorr_score(onset: &[f64], lag: usize) -> f64 {
    if lag >= onset.len() {
        return 0.0;
    }
    (lag..onset.len()).map(|i| onset[i] * onset[i - lag]).sum()
}

/// Phase with the maximum total strength, ties resolved to the smallest phase.
fn phase_winner(onset: &[f64], lag: usize) -> usize {
    let mut totals = vec![0.0f64; lag];
    for (i, &v) in onset.iter().enumerate() {
        totals[i % lag] += v;
    }
    let mut best_phase = 0usize;
    let mut best_total = totals[0];
    for (phase, &total) in totals.iter().enumerate().skip(1) {
        if total > best_total {
            best_total = total;
            best_phase = phase;
        }
    }
    best_phase
}

fn beat_flags(strength: &[f64], lag: usize, phase: usize) -> Vec<bool> {
    let mean_strength = if strength.is_empty() {
        0.0
    } else {
        strength.iter().sum::<f64>() / strength.len() as f64
    };
    let tau = (1.35 * mean_strength).max(0.12);

    strength
        .iter()
        .enumerate()
        .map(|(i, &s)| i % lag == phase && s >= tau)
        .collect()
}
