//! Error types shared across ServeCoach crates.

use std::path::PathBuf;

/// Top-level error type for ServeCoach operations.
#[derive(Debug, thiserror::Error)]
pub enum ServeCoachError {
    #[error("Enrichment error: {message}")]
    Enrichment { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ServeCoachError.
pub type ServeCoachResult<T> = Result<T, ServeCoachError>;

impl ServeCoachError {
    pub fn enrichment(msg: impl Into<String>) -> Self {
        Self::Enrichment {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors_format_messages() {
        let err = ServeCoachError::invalid_input("frame 3 arrived after frame 7");
        assert_eq!(err.to_string(), "Invalid input: frame 3 arrived after frame 7");

        let err = ServeCoachError::enrichment("no API key");
        assert_eq!(err.to_string(), "Enrichment error: no API key");
    }

    #[test]
    fn test_json_error_converts_transparently() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let expected = parse_err.to_string();
        let err: ServeCoachError = parse_err.into();
        assert_eq!(err.to_string(), expected);
    }
}
