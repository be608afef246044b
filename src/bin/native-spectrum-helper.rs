// src/bin/native-spectrum-helper.rs

use std::io;
use std::process::ExitCode;

use tz_spectrum_helper::helper;

/// Process entry point (spec.md §6.1): no arguments, one JSON request on
/// stdin, one JSON response on stdout, a single-line diagnostic on stderr
/// if anything fails.
fn main() -> ExitCode {
    tz_spectrum_helper::logging::init();

    match helper::run(io::stdin(), io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("native-spectrum-helper: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
