//! Native WAV fast path (spec.md §4.2.1).
//!
//! Built on `hound`, which already performs the RIFF chunk walk (including
//! skipping chunks we don't care about) and reports the `fmt ` payload
//! through `WavSpec`. Our job is narrower: apply the acceptance predicate —
//! PCM, 16-bit, mono or stereo — and reject (as a plain `String` reason,
//! not a process-exit decision) on anything else, including a truncated or
//! missing `data` chunk. The caller (`decode::decode_audio_file`) decides
//! whether a WAV-path failure is terminal or should fall through to ffmpeg.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};

use super::DecodedAudio;

pub fn decode_wav_file(track_path: &str) -> Result<DecodedAudio, String> {
    let bytes = std::fs::read(track_path).map_err(|e| format!("open {track_path}: {e}"))?;
    decode_wav_bytes(&bytes)
}

fn decode_wav_bytes(bytes: &[u8]) -> Result<DecodedAudio, String> {
    let mut reader = WavReader::new(Cursor::new(bytes)).map_err(|e| format!("parse: {e}"))?;

    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(format!(
            "unsupported format (sample_format={:?}, bits_per_sample={})",
            spec.sample_format, spec.bits_per_sample
        ));
    }
    if spec.channels != 1 && spec.channels != 2 {
        return Err(format!("unsupported channel count {}", spec.channels));
    }

    let interleaved: Vec<i16> = reader
        .samples::<i16>()
        .collect::<Result<Vec<i16>, _>>()
        .map_err(|e| format!("truncated or corrupt data chunk: {e}"))?;

    let channels = spec.channels as usize;
    if interleaved.len() % channels != 0 {
        return Err("data chunk holds a partial frame".to_string());
    }

    let frame_count = interleaved.len() / channels;
    let mut left = Vec::with_capacity(frame_count);
    let mut right = Vec::with_capacity(frame_count);

    if channels == 1 {
        for &s in &interleaved {
            let v = s as f32 / 32768.0;
            left.push(v);
            right.push(v);
        }
    } else {
        for frame in interleaved.chunks_exact(2) {
            left.push(frame[0] as f32 / 32768.0);
            right.push(frame[1] as f32 / 32768.0);
        }
    }

    Ok(DecodedAudio::from_stereo(left, right, spec.sample_rate))
}
