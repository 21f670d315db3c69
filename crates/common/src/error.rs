//! Error types shared across the Inkstroke tools.

use std::path::PathBuf;

/// Top-level error type for tool-side Inkstroke operations.
///
/// The modeling library reports its own `ModelerError`; this type wraps the
/// failures that surround it (files, parsing, configuration).
#[derive(Debug, thiserror::Error)]
pub enum InkstrokeError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input stream error at line {line}: {message}")]
    Input { line: usize, message: String },

    #[error("Modeler error: {message}")]
    Modeler { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using InkstrokeError.
pub type InkstrokeResult<T> = Result<T, InkstrokeError>;

impl InkstrokeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn input(line: usize, msg: impl Into<String>) -> Self {
        Self::Input {
            line,
            message: msg.into(),
        }
    }

    pub fn modeler(msg: impl Into<String>) -> Self {
        Self::Modeler {
            message: msg.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_mentions_line() {
        let err = InkstrokeError::input(7, "bad event type");
        assert_eq!(
            err.to_string(),
            "Input stream error at line 7: bad event type"
        );
    }

    #[test]
    fn test_json_error_is_transparent() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let expected = parse.to_string();
        let err: InkstrokeError = parse.into();
        assert_eq!(err.to_string(), expected);
    }
}
