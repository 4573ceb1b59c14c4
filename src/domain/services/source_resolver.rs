//! Update mode resolution
//!
//! Decides once, from path identity alone, whether a run deploys the tree it
//! is running from or copies in an external tree. Callers pass canonical
//! paths; nothing here touches the file system.

use std::path::{Path, PathBuf};

use crate::domain::value_objects::UpdateMode;

/// Result of resolving where new code comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub mode: UpdateMode,
    pub source: PathBuf,
    /// Explicit source that was overridden by self-update detection
    pub ignored_source: Option<PathBuf>,
}

/// Resolve the update mode and source tree.
///
/// `origin` is the directory the orchestrator runs from. When it lies inside
/// `root`, the installation is its own source. Otherwise the source is
/// `explicit`, or the parent of `origin` when none was given.
pub fn resolve_source(root: &Path, origin: &Path, explicit: Option<&Path>) -> Resolution {
    if origin.starts_with(root) {
        return Resolution {
            mode: UpdateMode::SelfUpdate,
            source: root.to_path_buf(),
            ignored_source: explicit.filter(|p| *p != root).map(Path::to_path_buf),
        };
    }

    let source = match explicit {
        Some(path) => path.to_path_buf(),
        None => origin.parent().unwrap_or(origin).to_path_buf(),
    };

    let mode = if source == root {
        UpdateMode::SelfUpdate
    } else {
        UpdateMode::ExternalUpdate
    };

    Resolution {
        mode,
        source,
        ignored_source: None,
    }
}
