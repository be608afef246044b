//! Top-level pipeline orchestration: the linear `C1 -> C2 -> C3 -> C4a ->
//! [C4b] -> [C4c] -> C5` state machine. See spec.md §4.8.
//!
//! There is nothing to overlap here: a single request decodes a single
//! track and runs a handful of DSP passes over it, all on the calling
//! thread. The only other actor in the process is the ffmpeg child the
//! decode stage may spawn, and that is owned entirely within `decode::decode_audio_file`.

use std::io::{BufWriter, Read, Write};
use std::time::Instant;

use crate::beat::{compute_beat, BeatResult};
use crate::decode::decode_audio_file;
use crate::request::parse;
use crate::resample::resample_mono;
use crate::response::{emit_response, Response, Timings};
use crate::spectrum::compute_spectrogram;
use crate::waveform::compute_waveform_proxy;
use crate::Result;

/// Run one request end to end: read JSON from `r`, decode and analyze the
/// referenced track, write one JSON response to `w`.
///
/// Any stage failing short-circuits the rest (spec.md §4.8) — the error's
/// `exit_code()` is what the binary entry point reports.
pub fn run<R: Read, W: Write>(mut r: R, w: W) -> Result<()> {
    let total_start = Instant::now();

    let mut body = Vec::new();
    r.read_to_end(&mut body)?;
    let request = parse(&body)?;

    let decode_start = Instant::now();
    let mut audio = decode_audio_file(&request.track_path)?;
    let decode_ms = elapsed_ms(decode_start);

    resample_mono(&mut audio, request.spectrum.mono_target_rate_hz);

    let spectrum_start = Instant::now();
    let frames = compute_spectrogram(
        &audio.mono_samples,
        audio.mono_rate,
        request.spectrum.hop_ms,
        request.spectrum.band_count,
        request.spectrum.max_frames,
    )?;
    let spectrum_ms = elapsed_ms(spectrum_start);

    let (beat_ms, beat) = if let Some(params) = request.beat {
        let start = Instant::now();
        let result = compute_beat(&audio.mono_samples, audio.mono_rate, params.hop_ms, params.max_frames);
        (elapsed_ms(start), Some(result))
    } else {
        (0.0, None)
    };

    let (waveform_proxy_ms, waveform_proxy) = if let Some(params) = request.waveform_proxy {
        let start = Instant::now();
        let hops = compute_waveform_proxy(
            &audio.left_samples,
            &audio.right_samples,
            audio.stereo_rate,
            params.hop_ms,
            params.max_frames,
        );
        (elapsed_ms(start), Some(hops))
    } else {
        (0.0, None)
    };

    let timings = Timings {
        decode_ms,
        spectrum_ms,
        beat_ms,
        waveform_proxy_ms,
        total_ms: elapsed_ms(total_start),
    };

    let beat_ref: Option<&BeatResult> = beat.as_ref();
    let response = Response {
        duration_ms: audio.duration_ms,
        frames: &frames,
        beat: beat_ref,
        waveform_proxy: waveform_proxy.as_deref(),
        timings,
    };

    let mut writer = BufWriter::new(w);
    emit_response(&mut writer, &response)?;
    writer.flush()?;
    Ok(())
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
