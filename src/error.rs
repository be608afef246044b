use std::error::Error as StdError;

use thiserror::Error;

/// This crate's result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The failure taxonomy from the request/decode/DSP contract (spec.md §7).
///
/// Kept decoupled from `anyhow` so the exit-code mapping in `main` never has
/// to re-derive intent by string-matching a diagnostic message.
#[derive(Debug, Error)]
pub enum Error {
    /// The request body failed schema validation: empty/unparseable stdin,
    /// mismatched `schema`, or a missing/empty `track_path`. Exit code 2.
    #[error("{0}")]
    RequestContract(String),

    /// A decode, resample, or DSP stage failure. Exit code 1.
    #[error("{0}")]
    Analysis(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub fn request_contract(message: impl Into<String>) -> Self {
        Self::RequestContract(message.into())
    }

    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis(message.into())
    }

    /// The process exit code this error maps to, per spec.md §4.8.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::RequestContract(_) => 2,
            Error::Analysis(_) | Error::Other(_) => 1,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<hound::Error> for Error {
    fn from(err: hound::Error) -> Self {
        Self::Analysis(format!("wav decode: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_contract_maps_to_exit_code_2() {
        let err = Error::request_contract("invalid request schema or fields");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "invalid request schema or fields");
    }

    #[test]
    fn analysis_maps_to_exit_code_1() {
        let err = Error::analysis("analysis failed (spectrum)");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn io_error_maps_to_exit_code_1() {
        let io_err = std::io::Error::other("boom");
        let err: Error = io_err.into();
        assert_eq!(err.exit_code(), 1);
    }
}
