//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OpsError {
    /// Buffer-level failure (bounds, dimensions).
    #[error(transparent)]
    Core(#[from] retouch_core::Error),

    /// No filter registered under this name.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// Adjustment parameter name not recognized.
    #[error("unknown adjustment parameter: {0}")]
    UnknownParameter(String),

    /// Kernel shape or weights are unusable.
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),
}

impl OpsError {
    /// Returns `true` for conditions a UI should report to the user and move
    /// on from, as opposed to caller bugs.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnknownFilter(_) | Self::UnknownParameter(_))
    }
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
