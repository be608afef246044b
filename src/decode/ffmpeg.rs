//! Delegated ffmpeg decode path (spec.md §4.2.2).
//!
//! `std::process::Command` already gives us the pipe-lifecycle behavior the
//! spec describes as a manual per-platform adapter in the original C POC:
//! `Stdio::null()` for stdin/stderr plus `Stdio::piped()` for stdout yields
//! exactly "child inherits stdout->pipe only; stderr and stdin are null",
//! with the read end of the pipe non-inheritable by construction. Argument
//! quoting (including Windows' `"`-escaping rules) is likewise handled by
//! `Command` itself — we never need to hand-quote `track_path`.

use std::io::Read;
use std::process::{Child, Command, Stdio};

use super::DecodedAudio;
use crate::error::{Error, Result};

const FFMPEG_RATE: u32 = 44_100;

pub fn decode_with_ffmpeg(track_path: &str) -> Result<DecodedAudio> {
    let mut child = spawn_ffmpeg(track_path)
        .map_err(|e| Error::analysis(format!("ffmpeg decode: spawn failed: {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::analysis("ffmpeg decode: child stdout not piped".to_string()))?;

    let bytes = match read_to_end_checked(stdout) {
        Ok(bytes) => bytes,
        Err(e) => {
            // We couldn't finish reading; the child may still be producing
            // output into a pipe nobody drains. Killing it lets its next
            // write fail instead of blocking forever.
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::analysis(format!("ffmpeg decode: {e}")));
        }
    };

    let status = child
        .wait()
        .map_err(|e| Error::analysis(format!("ffmpeg decode: wait failed: {e}")))?;

    if !status.success() {
        return Err(Error::analysis(format!(
            "ffmpeg decode: ffmpeg exit_code={}",
            status.code().map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string())
        )));
    }

    if bytes.len() < 4 {
        return Err(Error::analysis(format!(
            "ffmpeg decode: short read ({} bytes)",
            bytes.len()
        )));
    }

    Ok(bytes_to_decoded_audio(&bytes))
}

fn spawn_ffmpeg(track_path: &str) -> std::io::Result<Child> {
    Command::new("ffmpeg")
        .args([
            "-v",
            "error",
            "-i",
            track_path,
            "-vn",
            "-sn",
            "-dn",
            "-f",
            "s16le",
            "-acodec",
            "pcm_s16le",
            "-ac",
            "2",
            "-ar",
            &FFMPEG_RATE.to_string(),
            "pipe:1",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
}

/// Read a child's stdout pipe to EOF, retrying on `Interrupted`, with an
/// explicit fallible-allocation path (spec.md §9: "every heap allocation
/// must be checked").
fn read_to_end_checked(mut r: impl Read) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 64 * 1024];

    loop {
        match r.read(&mut chunk) {
            Ok(0) => return Ok(buf),
            Ok(n) => {
                buf.try_reserve(n).map_err(|_| {
                    std::io::Error::other("allocation failure while buffering ffmpeg output")
                })?;
                buf.extend_from_slice(&chunk[..n]);
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Interpret `bytes` as little-endian interleaved signed 16-bit stereo PCM
/// at [`FFMPEG_RATE`] Hz (spec.md §4.2.2).
fn bytes_to_decoded_audio(bytes: &[u8]) -> DecodedAudio {
    let frame_count = bytes.len() / 4;
    let mut left = Vec::with_capacity(frame_count);
    let mut right = Vec::with_capacity(frame_count);

    for frame in bytes.chunks_exact(4) {
        let l = i16::from_le_bytes([frame[0], frame[1]]);
        let r = i16::from_le_bytes([frame[2], frame[3]]);
        left.push(l as f32 / 32768.0);
        right.push(r as f32 / 32768.0);
    }

    DecodedAudio::from_stereo(left, right, FFMPEG_RATE)
}
