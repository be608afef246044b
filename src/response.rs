//! Response emission (C5): stream the analysis result to stdout as one JSON
//! object with a fixed field order. See spec.md §4.7.
//!
//! We write directly to a `Write` rather than building a `serde_json::Value`
//! first: the `frames` array can hold tens of thousands of entries for a
//! long track, and a `Value` tree would duplicate that memory for no
//! benefit. Each frame array is still encoded element-by-element with
//! `serde_json::to_writer` the way `JsonArrayEncoder` streams segments,
//! just inlined here since the envelope around the frames is fixed shape
//! rather than a bare array.

use std::io::Write;

use crate::beat::BeatResult;
use crate::spectrum::SpectrumFrame;
use crate::waveform::WaveformHop;
use crate::Result;

/// Per-stage timings, all in milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timings {
    pub decode_ms: f64,
    pub spectrum_ms: f64,
    pub beat_ms: f64,
    pub waveform_proxy_ms: f64,
    pub total_ms: f64,
}

/// Everything the pipeline produced, ready to serialize.
pub struct Response<'a> {
    pub duration_ms: i64,
    pub frames: &'a [SpectrumFrame],
    pub beat: Option<&'a BeatResult>,
    pub waveform_proxy: Option<&'a [WaveformHop]>,
    pub timings: Timings,
}

pub fn emit_response<W: Write>(w: &mut W, response: &Response<'_>) -> Result<()> {
    write!(w, "{{\"schema\":")?;
    serde_json::to_writer(&mut *w, crate::RESPONSE_SCHEMA)?;
    write!(w, ",\"helper_version\":")?;
    serde_json::to_writer(&mut *w, crate::HELPER_VERSION)?;
    write!(w, ",\"duration_ms\":{}", response.duration_ms)?;

    write!(w, ",\"frames\":[")?;
    for (i, frame) in response.frames.iter().enumerate() {
        if i > 0 {
            write!(w, ",")?;
        }
        write!(w, "[{},", frame.pos_ms)?;
        write_byte_array(w, &frame.bands)?;
        write!(w, "]")?;
    }
    write!(w, "]")?;

    if let Some(beat) = response.beat.filter(|b| !b.frames.is_empty()) {
        write!(w, ",\"beat\":{{\"duration_ms\":{},\"bpm\":{:.3},\"frames\":[", response.duration_ms, beat.bpm)?;
        for (i, frame) in beat.frames.iter().enumerate() {
            if i > 0 {
                write!(w, ",")?;
            }
            write!(
                w,
                "[{},{},{}]",
                frame.pos_ms,
                frame.strength_u8,
                if frame.is_beat { "true" } else { "false" }
            )?;
        }
        write!(w, "]}}")?;
    }

    if let Some(hops) = response.waveform_proxy.filter(|h| !h.is_empty()) {
        write!(w, ",\"waveform_proxy\":{{\"duration_ms\":{},\"frames\":[", response.duration_ms)?;
        for (i, hop) in hops.iter().enumerate() {
            if i > 0 {
                write!(w, ",")?;
            }
            write!(
                w,
                "[{},{},{},{},{}]",
                hop.pos_ms, hop.left_min, hop.left_max, hop.right_min, hop.right_max
            )?;
        }
        write!(w, "]}}")?;
    }

    write!(
        w,
        ",\"timings\":{{\"decode_ms\":{:.3},\"spectrum_ms\":{:.3},\"beat_ms\":{:.3},\"waveform_proxy_ms\":{:.3},\"total_ms\":{:.3}}}}}",
        response.timings.decode_ms,
        response.timings.spectrum_ms,
        response.timings.beat_ms,
        response.timings.waveform_proxy_ms,
        response.timings.total_ms,
    )?;

    w.flush()?;
    Ok(())
}

fn write_byte_array<W: Write>(w: &mut W, bytes: &[u8]) -> Result<()> {
    write!(w, "[")?;
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            write!(w, ",")?;
        }
        write!(w, "{b}")?;
    }
    write!(w, "]")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_response_omits_optional_blocks() {
        let frames = vec![SpectrumFrame { pos_ms: 0, bands: vec![1, 2, 3] }];
        let response = Response {
            duration_ms: 1000,
            frames: &frames,
            beat: None,
            waveform_proxy: None,
            timings: Timings::default(),
        };

        let mut out = Vec::new();
        emit_response(&mut out, &response).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with(r#"{"schema":"tz_player.native_spectrum_helper_response.v1","#));
        assert!(text.contains(r#""duration_ms":1000"#));
        assert!(text.contains(r#""frames":[[0,[1,2,3]]]"#));
        assert!(!text.contains("\"beat\""));
        assert!(!text.contains("\"waveform_proxy\""));
        assert!(text.contains("\"timings\":{"));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn empty_beat_and_waveform_results_are_omitted() {
        let frames = vec![SpectrumFrame { pos_ms: 0, bands: vec![0] }];
        let beat = BeatResult { bpm: 0.0, frames: Vec::new() };
        let waveform: Vec<WaveformHop> = Vec::new();
        let response = Response {
            duration_ms: 1000,
            frames: &frames,
            beat: Some(&beat),
            waveform_proxy: Some(&waveform),
            timings: Timings::default(),
        };

        let mut out = Vec::new();
        emit_response(&mut out, &response).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("\"beat\""));
        assert!(!text.contains("\"waveform_proxy\""));
    }

    #[test]
    fn nonempty_beat_and_waveform_are_included_with_exact_shape() {
        use crate::beat::BeatFrame;
        use crate::waveform::WaveformHop as Hop;

        let frames = vec![SpectrumFrame { pos_ms: 0, bands: vec![0] }];
        let beat = BeatResult {
            bpm: 120.5,
            frames: vec![BeatFrame { pos_ms: 0, strength_u8: 200, is_beat: true }],
        };
        let hops = vec![Hop { pos_ms: 0, left_min: -64, left_max: 64, right_min: -10, right_max: 10 }];
        let response = Response {
            duration_ms: 2000,
            frames: &frames,
            beat: Some(&beat),
            waveform_proxy: Some(&hops),
            timings: Timings::default(),
        };

        let mut out = Vec::new();
        emit_response(&mut out, &response).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#""beat":{"duration_ms":2000,"bpm":120.500,"frames":[[0,200,true]]}"#));
        assert!(text.contains(r#""waveform_proxy":{"duration_ms":2000,"frames":[[0,-64,64,-10,10]]}"#));
    }
}
