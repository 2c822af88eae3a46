//! Error types for edit sessions.
//!
//! Wraps the lower crates' errors and adds the conditions that only exist
//! at session level:
//! - Undo/redo past either end of the history
//! - Unknown preset names
//! - Config file loading

use std::path::PathBuf;
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur in an edit session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Nothing to undo, redo or jump to.
    #[error("no history: {0}")]
    NoHistory(&'static str),

    /// No preset registered under this name.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// Config file doesn't exist.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// Config parsed but holds unusable values.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Pixel operation failed.
    #[error(transparent)]
    Ops(#[from] retouch_ops::OpsError),

    /// Buffer-level failure.
    #[error(transparent)]
    Core(#[from] retouch_core::Error),

    /// I/O error reading config files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SessionError {
    /// Returns `true` for conditions a UI should report and move on from:
    /// an empty history, an unknown filter or preset name.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NoHistory(_) | Self::UnknownPreset(_) => true,
            Self::Ops(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retouch_ops::OpsError;

    #[test]
    fn test_recoverable() {
        assert!(SessionError::NoHistory("undo").is_recoverable());
        assert!(SessionError::UnknownPreset("x".into()).is_recoverable());
        assert!(SessionError::from(OpsError::UnknownFilter("x".into())).is_recoverable());
        assert!(!SessionError::from(retouch_core::Error::invalid_dimensions(0, 0, "zero")).is_recoverable());
        assert!(!SessionError::InvalidConfig("capacity".into()).is_recoverable());
    }

    #[test]
    fn test_display() {
        let e = SessionError::from(OpsError::UnknownFilter("lomo".into()));
        assert_eq!(e.to_string(), "unknown filter: lomo");
        assert_eq!(SessionError::NoHistory("redo").to_string(), "no history: redo");
    }
}
