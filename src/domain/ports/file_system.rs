//! FileSystem port - abstraction over the tree operations an update needs
//!
//! The update use case copies, swaps and hashes whole directory trees. This
//! trait keeps those operations behind a seam so tests can inject faults
//! (for example a snapshot copy that silently writes nothing).

use std::path::{Path, PathBuf};

use crate::domain::value_objects::ContentHash;

/// Result type for file system operations
pub type FsResult<T> = Result<T, FsError>;

/// File system operation errors
#[derive(Debug)]
pub enum FsError {
    /// File not found
    NotFound(PathBuf),
    /// Permission denied
    PermissionDenied(PathBuf),
    /// I/O error on a specific path
    Io { path: PathBuf, source: std::io::Error },
    /// Other error
    Other(String),
}

impl FsError {
    /// Attach a path to an I/O error, keeping the common kinds distinguishable.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path),
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path),
            _ => FsError::Io { path, source: err },
        }
    }
}

impl From<std::io::Error> for FsError {
    fn from(err: std::io::Error) -> Self {
        FsError::io(PathBuf::new(), err)
    }
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsError::NotFound(path) => write!(f, "File not found: {}", path.display()),
            FsError::PermissionDenied(path) => {
                write!(f, "Permission denied: {}", path.display())
            }
            FsError::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
            FsError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FsError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Abstract file system interface
///
/// Implementations:
/// - `LocalFs` - standard file I/O
/// - test doubles wrapping `LocalFs` to inject faults
pub trait FileSystem {
    /// Check if a path exists (symlinks are not followed)
    fn exists(&self, path: &Path) -> bool;

    /// Check if a path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// A file that exists, or a directory with at least one entry
    fn has_content(&self, path: &Path) -> bool;

    /// Read file content as string
    fn read(&self, path: &Path) -> FsResult<String>;

    /// Write content to file atomically, creating parent directories
    fn write(&self, path: &Path, content: &str) -> FsResult<()>;

    /// Create directory and parents
    fn create_dir_all(&self, path: &Path) -> FsResult<()>;

    /// Recursively copy a file or directory, preserving permissions and
    /// modification times. The destination must not exist.
    fn copy_tree(&self, from: &Path, to: &Path) -> FsResult<()>;

    /// Remove a file or directory tree. Missing paths are not an error.
    fn remove_tree(&self, path: &Path) -> FsResult<()>;

    /// Rename a path (same file system)
    fn rename(&self, from: &Path, to: &Path) -> FsResult<()>;

    /// Content hash of a file or a whole directory tree
    fn hash_tree(&self, path: &Path) -> FsResult<ContentHash>;

    /// Resolve symlinks and relative components
    fn canonicalize(&self, path: &Path) -> FsResult<PathBuf>;

    /// Add owner read/write bits (and owner execute on directories) to a path
    /// and everything beneath it. No-op on platforms without mode bits.
    fn ensure_owner_writable(&self, path: &Path) -> FsResult<()>;
}
