//! Error types for the Nearbook engine

use thiserror::Error;

/// Failure of a single availability probe (one library, one book).
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Every configured credential was rejected or quota-limited before a
    /// definitive answer was obtained. Signals a systemic problem (e.g. all
    /// keys rate-limited), distinct from "library doesn't have the book".
    #[error("all {attempted} credentials exhausted while probing library {library_code}")]
    AllCredentialsExhausted {
        library_code: String,
        attempted: usize,
    },

    /// The availability endpoint returned a payload we could not interpret.
    /// Never conflated with a definitive "not available".
    #[error("malformed availability response for library {library_code}: {reason}")]
    ResponseParse {
        library_code: String,
        reason: String,
    },

    /// The outbound request itself failed (connect, timeout, body read).
    #[error("availability request for library {library_code} failed: {source}")]
    Transport {
        library_code: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Failure of a whole resolution request.
///
/// A resolution never returns partial results: the first probe failure makes
/// the entire request fail, because the caller could not otherwise tell
/// "confirmed unavailable" apart from "status unknown".
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("availability probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("catalog snapshot unavailable: {0}")]
    Catalog(String),

    #[error("probe worker aborted: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
