//! InstallationTarget entity

use std::path::{Path, PathBuf};

use crate::domain::entities::layout::{CodePath, Layout, RuntimePath};

/// Directory under the installation root that holds orchestrator metadata.
pub const META_DIR: &str = ".inplace";

/// The long-lived deployment root and its classified paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationTarget {
    root: PathBuf,
    layout: Layout,
}

impl InstallationTarget {
    pub fn new(root: impl Into<PathBuf>, layout: Layout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn code_abs(&self, code: &CodePath) -> PathBuf {
        self.root.join(&code.relative)
    }

    pub fn runtime_abs(&self, runtime: &RuntimePath) -> PathBuf {
        self.root.join(&runtime.relative)
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join(self.layout.log_file())
    }

    pub fn dependency_env(&self) -> PathBuf {
        self.root.join(self.layout.dependency_env())
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join(self.layout.manifest())
    }

    pub fn meta_dir(&self) -> PathBuf {
        self.root.join(META_DIR)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.meta_dir().join("lock")
    }

    pub fn record_path(&self) -> PathBuf {
        self.meta_dir().join("record.json")
    }

    /// Scratch area for staged code copies; same file system as the root so
    /// swaps are plain renames.
    pub fn staging_dir(&self) -> PathBuf {
        self.meta_dir().join("staging")
    }
}
