//! `tz-spectrum-helper` — the decode + DSP core of `tz_player`'s native spectrum helper.
//!
//! This crate implements a one-shot batch pipeline: read a JSON analysis
//! request from any `Read`, decode the referenced audio file, run a
//! spectrogram pass plus optional beat and waveform-proxy passes over the
//! decoded audio, and write a single JSON response to any `Write`.
//!
//! The pipeline is deliberately synchronous and single-threaded (save for
//! the one ffmpeg child process spawned by the decode stage): this process
//! is invoked once per analysis request by an external caching layer that
//! parallelizes by running many helper processes, not by running one helper
//! process concurrently.

// Decoded-audio acquisition: native WAV chunk walk, or delegated ffmpeg child process.
pub mod decode;

// Crate-wide error type and exit-code mapping.
pub mod error;

// Top-level pipeline orchestration (the C1..C5 state machine).
pub mod helper;

// Logging configuration and control.
pub mod logging;

// Request parsing: schema validation, nested/legacy field fallback, floors.
pub mod request;

// Mono downsampling (nearest-sample decimation).
pub mod resample;

// Response serialization (streamed JSON emission).
pub mod response;

// Beat / onset timeline (C4b).
pub mod beat;

// Log-magnitude Goertzel-bank spectrogram (C4a).
pub mod spectrum;

// Per-hop stereo min/max waveform proxy (C4c).
pub mod waveform;

pub use error::{Error, Result};

/// Build-time identifier for this helper implementation, embedded in every response.
pub const HELPER_VERSION: &str = concat!("tz-spectrum-helper/", env!("CARGO_PKG_VERSION"));

/// Request schema tag this build accepts.
pub const REQUEST_SCHEMA: &str = "tz_player.native_spectrum_helper_request.v1";

/// Response schema tag this build emits.
pub const RESPONSE_SCHEMA: &str = "tz_player.native_spectrum_helper_response.v1";
