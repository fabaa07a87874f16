//! Error types for chess-commentary-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid FEN: {0}")]
    InvalidPosition(String),

    #[error("Illegal move {uci} in position {fen}")]
    IllegalMove { uci: String, fen: String },

    #[error("Invalid PGN: {0}")]
    InvalidGame(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Commentary request failed: {0}")]
    Commentary(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn engine(err: impl std::fmt::Display) -> Self {
        Error::EngineUnavailable(err.to_string())
    }

    /// True when the caller supplied bad input and can fix the request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidPosition(_) | Error::InvalidGame(_) | Error::InvalidRequest(_)
        )
    }

    /// Message safe to hand back to the caller.
    ///
    /// Client errors carry their full detail. Engine and upstream failures
    /// are reported generically so executable paths and upstream payloads
    /// stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            e if e.is_client_error() => e.to_string(),
            Error::IllegalMove { .. } | Error::EngineUnavailable(_) => {
                "Engine analysis failed".to_string()
            }
            _ => "Commentary service unavailable".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
