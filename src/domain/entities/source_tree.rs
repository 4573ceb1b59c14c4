//! SourceTree entity

use std::path::{Path, PathBuf};

use crate::domain::entities::layout::{CodeRole, Layout};
use crate::domain::ports::FileSystem;
use crate::error::{InplaceError, InplaceResult};

/// Name of the version-control marker looked for at the source root
pub const VCS_MARKER: &str = ".git";

/// A directory believed to contain deployable code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
    root: PathBuf,
    present: Vec<CodeRole>,
    missing_required: Vec<PathBuf>,
    has_vcs: bool,
}

impl SourceTree {
    /// Probe `root` for the code paths of `layout`.
    pub fn inspect<FS: FileSystem + ?Sized>(fs: &FS, root: &Path, layout: &Layout) -> Self {
        let mut present = Vec::new();
        let mut missing_required = Vec::new();
        for code in layout.code_paths() {
            if fs.is_dir(&root.join(&code.relative)) {
                present.push(code.role);
            } else if code.required {
                missing_required.push(code.relative.clone());
            }
        }

        Self {
            root: root.to_path_buf(),
            present,
            missing_required,
            has_vcs: fs.exists(&root.join(VCS_MARKER)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has(&self, role: CodeRole) -> bool {
        self.present.contains(&role)
    }

    pub fn has_backend(&self) -> bool {
        self.has(CodeRole::Backend)
    }

    pub fn has_frontend(&self) -> bool {
        self.has(CodeRole::Frontend)
    }

    pub fn has_vcs(&self) -> bool {
        self.has_vcs
    }

    pub fn is_valid(&self) -> bool {
        self.missing_required.is_empty()
    }

    /// Fail unless every required code subtree is present.
    pub fn validate(&self) -> InplaceResult<()> {
        if self.is_valid() {
            return Ok(());
        }
        let missing = self
            .missing_required
            .iter()
            .map(|p| format!("{}/", p.display()))
            .collect::<Vec<_>>()
            .join(", ");
        Err(InplaceError::InvalidSource {
            root: self.root.clone(),
            reason: format!("missing {}", missing),
        })
    }
}
