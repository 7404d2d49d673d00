use thiserror::Error;

/// Errors surfaced by the tracing core.
///
/// Per-frame conditions (no face, lost lock) are never errors; only setup
/// problems and a missing detection source end up here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid config: `{field}` {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    #[error("word bank is empty")]
    EmptyWordBank,

    #[error("word {0:?} contains characters other than A-Z and spaces")]
    InvalidWord(String),

    #[error("no checkpoints defined for letter '{0}'")]
    MissingCheckpoints(char),

    #[error("checkpoint table key {0:?} is not a single letter A-Z")]
    InvalidLetterKey(String),

    #[error("checkpoints for '{letter}' are invalid: {reason}")]
    InvalidCheckpoints { letter: char, reason: &'static str },

    #[error("detection source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
