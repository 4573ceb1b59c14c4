//! Error types for inplace
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::{CommandError, FsError};

/// Result type alias for inplace operations
pub type InplaceResult<T> = Result<T, InplaceError>;

/// Main error type for inplace operations
#[derive(Error, Debug)]
pub enum InplaceError {
    /// Source tree is missing a required subtree
    #[error("invalid source tree {root}: {reason}")]
    InvalidSource { root: PathBuf, reason: String },

    /// Layout classification is inconsistent
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// No installation root from flag, environment or config
    #[error("no installation root configured (pass --target, set INPLACE_TARGET or [install] root)")]
    MissingTarget,

    /// Configuration file could not be parsed
    #[error("invalid configuration in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// Runtime state would be lost if the run continued
    #[error("refusing to continue: runtime state at {path} would be lost ({reason})")]
    DataLossPrevented { path: PathBuf, reason: String },

    /// Another run holds the installation lock
    #[error("another update is already running against {root}")]
    RunInProgress { root: PathBuf },

    /// Operator interrupted the run
    #[error("update interrupted before deployment")]
    Interrupted,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File system port error
    #[error(transparent)]
    Fs(#[from] FsError),

    /// External command error
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl InplaceError {
    /// Whether the run was rejected before anything was touched
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            InplaceError::InvalidSource { .. }
                | InplaceError::InvalidLayout(_)
                | InplaceError::MissingTarget
                | InplaceError::Config { .. }
        )
    }

    /// Path most relevant to this error, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            InplaceError::InvalidSource { root, .. } => Some(root),
            InplaceError::Config { file, .. } => Some(file),
            InplaceError::DataLossPrevented { path, .. } => Some(path),
            InplaceError::RunInProgress { root } => Some(root),
            _ => None,
        }
    }
}
