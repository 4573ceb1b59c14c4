//! Deployment Executor
//!
//! Replaces the code paths of an installation with those of a source tree.
//! Every code path is staged first; installed code is only touched once all
//! copies succeeded. Runtime paths are never iterated here.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::entities::{CodePath, InstallationTarget};
use crate::domain::ports::{FileSystem, FsError};
use crate::error::{InplaceError, InplaceResult};

/// Code paths that were replaced, relative to the root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    pub replaced: Vec<PathBuf>,
    /// Optional code paths the source did not carry
    pub missing_optional: Vec<PathBuf>,
    /// Live files kept across the swap (the application log)
    pub carried: Vec<PathBuf>,
}

impl DeployReport {
    pub fn summary(&self) -> String {
        let names = self
            .replaced
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        if names.is_empty() {
            "nothing to replace".to_string()
        } else {
            format!("replaced {}", names)
        }
    }
}

pub struct DeploymentExecutor<'a, FS: FileSystem + ?Sized> {
    fs: &'a FS,
}

impl<'a, FS: FileSystem + ?Sized> DeploymentExecutor<'a, FS> {
    pub fn new(fs: &'a FS) -> Self {
        Self { fs }
    }

    pub fn deploy(
        &self,
        target: &InstallationTarget,
        source_root: &Path,
    ) -> InplaceResult<DeployReport> {
        let staging = target.staging_dir();
        self.fs.remove_tree(&staging)?;
        self.fs.create_dir_all(&staging)?;

        let result = self.stage_and_swap(target, source_root, &staging);

        if let Err(e) = self.fs.remove_tree(&staging) {
            warn!(path = %staging.display(), error = %e, "could not clean staging area");
        }
        result
    }

    fn stage_and_swap(
        &self,
        target: &InstallationTarget,
        source_root: &Path,
        staging: &Path,
    ) -> InplaceResult<DeployReport> {
        let mut report = DeployReport::default();
        let mut staged: Vec<(&CodePath, PathBuf)> = Vec::new();

        for code in target.layout().code_paths() {
            let from = source_root.join(&code.relative);
            if !self.fs.is_dir(&from) {
                if code.required {
                    return Err(InplaceError::InvalidSource {
                        root: source_root.to_path_buf(),
                        reason: format!("missing {}/", code.relative.display()),
                    });
                }
                debug!(path = %code.relative.display(), "optional code path not in source");
                report.missing_optional.push(code.relative.clone());
                continue;
            }

            let slot = staging.join(slot_name(&code.relative));
            self.fs.copy_tree(&from, &slot)?;
            if self.carry_log(target, code, &slot)? {
                report.carried.push(target.layout().log_file().to_path_buf());
            }
            staged.push((code, slot));
        }

        for (code, slot) in staged {
            let dest = target.code_abs(code);
            self.swap(&slot, &dest)?;
            info!(path = %code.relative.display(), "code path replaced");
            report.replaced.push(code.relative.clone());
        }
        Ok(report)
    }

    /// Copy the live log file into a staged code path that contains it.
    /// Returns whether a log was carried.
    fn carry_log(
        &self,
        target: &InstallationTarget,
        code: &CodePath,
        slot: &Path,
    ) -> InplaceResult<bool> {
        let Ok(inner) = target.layout().log_file().strip_prefix(&code.relative) else {
            return Ok(false);
        };
        let live = target.log_file();
        if inner.as_os_str().is_empty() || !self.fs.exists(&live) || self.fs.is_dir(&live) {
            return Ok(false);
        }

        let staged_log = slot.join(inner);
        self.fs.remove_tree(&staged_log)?;
        self.fs.copy_tree(&live, &staged_log)?;
        debug!(path = %live.display(), "log file carried into staged code");
        Ok(true)
    }

    /// Move `dest` aside, move `staged` in, drop the old tree
    fn swap(&self, staged: &Path, dest: &Path) -> InplaceResult<()> {
        let aside = staged.with_extension("old");
        self.fs.remove_tree(&aside)?;

        let had_previous = self.fs.exists(dest);
        if had_previous {
            self.fs.rename(dest, &aside)?;
        } else if let Some(parent) = dest.parent() {
            self.fs.create_dir_all(parent)?;
        }

        if let Err(e) = self.fs.rename(staged, dest) {
            if had_previous {
                if let Err(back) = self.fs.rename(&aside, dest) {
                    return Err(FsError::Other(format!(
                        "could not swap {} ({}) nor put the old tree back ({})",
                        dest.display(),
                        e,
                        back
                    ))
                    .into());
                }
            }
            return Err(e.into());
        }

        if had_previous {
            self.fs.remove_tree(&aside)?;
        }
        Ok(())
    }
}

fn slot_name(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("__")
}
