//! Request parsing (C1): read a JSON analysis request and produce a fully
//! defaulted, floor-clamped [`Request`].
//!
//! The wire format is described in spec.md §3.1. We parse with
//! `serde_json::Value` rather than a hand-rolled byte scanner — the crate
//! already carries `serde_json` for response emission, and a real parser
//! gives us correct string/escape handling for free. The one behavior we
//! must reproduce exactly is the *precedence* spec.md describes: a nested
//! object field wins, then the legacy flat top-level field, then the
//! default; every resulting value is then clamped up to its floor.

use serde_json::Value;

use crate::error::{Error, Result};

/// Spectrogram analysis parameters, fully defaulted and floor-clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpectrumParams {
    pub mono_target_rate_hz: i64,
    pub hop_ms: i64,
    pub band_count: i64,
    pub max_frames: i64,
}

/// Beat/onset analysis parameters. Only present when the request enabled beat analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatParams {
    pub hop_ms: i64,
    pub max_frames: i64,
}

/// Waveform-proxy analysis parameters. Only present when the request enabled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformProxyParams {
    pub hop_ms: i64,
    pub max_frames: i64,
}

/// A fully validated, defaulted analysis request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub track_path: String,
    pub spectrum: SpectrumParams,
    pub beat: Option<BeatParams>,
    pub waveform_proxy: Option<WaveformProxyParams>,
}

/// Parse and validate a request from raw bytes read to EOF from stdin.
///
/// Failure modes (spec.md §4.1):
/// - empty/unreadable/unparseable body → `invalid json request` (exit 2)
/// - missing/mismatched `schema`, or missing/empty `track_path` →
///   `invalid request schema or fields` (exit 2)
pub fn parse(body: &[u8]) -> Result<Request> {
    if body.is_empty() {
        return Err(Error::request_contract("invalid json request"));
    }

    let root: Value =
        serde_json::from_slice(body).map_err(|_| Error::request_contract("invalid json request"))?;

    let schema = root.get("schema").and_then(Value::as_str);
    if schema != Some(crate::REQUEST_SCHEMA) {
        return Err(Error::request_contract("invalid request schema or fields"));
    }

    let track_path = root
        .get("track_path")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    if track_path.is_empty() {
        return Err(Error::request_contract("invalid request schema or fields"));
    }

    let spectrum = SpectrumParams {
        mono_target_rate_hz: field_i64(&root, &["spectrum", "mono_target_rate_hz"], "mono_target_rate_hz", 11_025),
        hop_ms: field_i64(&root, &["spectrum", "hop_ms"], "hop_ms", 40).max(10),
        band_count: field_i64(&root, &["spectrum", "band_count"], "band_count", 48).max(8),
        max_frames: field_i64(&root, &["spectrum", "max_frames"], "max_frames", 12_000).max(1),
    };

    // Unlike `waveform_proxy`, bare `beat` key presence is not enough: spec.md
    // §3.1 enables beat analysis only when at least one recognized field
    // (nested or legacy-flat) is actually present.
    let beat_obj = root.get("beat");
    let beat_enabled = beat_obj.is_some_and(|b| field_present(b, "hop_ms") || field_present(b, "max_frames"))
        || field_present_flat_any(&root, &["beat_timeline_hop_ms", "beat_timeline_max_frames"]);

    let beat = if beat_enabled {
        Some(BeatParams {
            hop_ms: field_i64(&root, &["beat", "hop_ms"], "beat_timeline_hop_ms", 40).max(10),
            max_frames: field_i64(&root, &["beat", "max_frames"], "beat_timeline_max_frames", 12_000).max(1),
        })
    } else {
        None
    };

    let waveform_proxy = if field_present(&root, "waveform_proxy")
        || field_present_flat_any(&root, &["waveform_proxy_hop_ms", "waveform_proxy_max_frames"])
    {
        Some(WaveformProxyParams {
            hop_ms: field_i64(&root, &["waveform_proxy", "hop_ms"], "waveform_proxy_hop_ms", 20).max(10),
            max_frames: field_i64(&root, &["waveform_proxy", "max_frames"], "waveform_proxy_max_frames", 30_000)
                .max(1),
        })
    } else {
        None
    };

    Ok(Request {
        track_path,
        spectrum,
        beat,
        waveform_proxy,
    })
}

/// Look up `root.<nested[0]>.<nested[1]>` as an integer; if absent, fall back to
/// `root.<flat_key>`; if still absent, use `default`.
///
/// Values present but not representable as an integer (e.g. a JSON float or
/// string) are treated as absent, since spec.md's request grammar never
/// reads floats from the request.
fn field_i64(root: &Value, nested: &[&str; 2], flat_key: &str, default: i64) -> i64 {
    let nested_val = root
        .get(nested[0])
        .and_then(|obj| obj.get(nested[1]))
        .and_then(Value::as_i64);

    nested_val
        .or_else(|| root.get(flat_key).and_then(Value::as_i64))
        .unwrap_or(default)
}

fn field_present(root: &Value, key: &str) -> bool {
    root.get(key).is_some()
}

fn field_present_flat_any(root: &Value, keys: &[&str]) -> bool {
    keys.iter().any(|k| root.get(*k).is_some())
}
