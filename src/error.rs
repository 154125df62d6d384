//! Error types for Lektor.

use thiserror::Error;

/// Library-level error type for Lektor operations.
///
/// Remote failures are tagged by origin (upload, transcription,
/// generation, remote cleanup) so adapters can log where a request died
/// without parsing message strings.
#[derive(Error, Debug)]
pub enum LektorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Audio upload failed: {0}")]
    Upload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Remote file cleanup failed: {0}")]
    RemoteCleanup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Lektor operations.
pub type Result<T> = std::result::Result<T, LektorError>;
