//! Permission Normalizer
//!
//! Keeps the data directory and the log file writable by the service user.
//! Safe to run on every update. Failures come back as warnings.

use tracing::warn;

use crate::domain::entities::{InstallationTarget, RuntimeRole};
use crate::domain::ports::{CommandRunner, FileSystem};
use crate::infrastructure::tools::Chown;

/// Identity the service runs as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceOwner {
    pub user: String,
    pub group: Option<String>,
}

impl ServiceOwner {
    /// `user` or `user:group`, as `chown` expects it
    pub fn spec(&self) -> String {
        match &self.group {
            Some(group) => format!("{}:{}", self.user, group),
            None => self.user.clone(),
        }
    }
}

pub struct PermissionNormalizer<'a, FS: FileSystem + ?Sized> {
    fs: &'a FS,
    chown: Chown<'a>,
}

impl<'a, FS: FileSystem + ?Sized> PermissionNormalizer<'a, FS> {
    pub fn new(fs: &'a FS, runner: &'a dyn CommandRunner, chown_program: &str) -> Self {
        Self {
            fs,
            chown: Chown::new(runner, chown_program),
        }
    }

    /// Returns one message per problem; an empty list means all fixed
    pub fn normalize(
        &self,
        target: &InstallationTarget,
        owner: Option<&ServiceOwner>,
    ) -> Vec<String> {
        let mut warnings = Vec::new();

        let log_file = target.log_file();
        if !self.fs.exists(&log_file) {
            if let Err(e) = self.fs.write(&log_file, "") {
                warnings.push(format!("could not create {}: {}", log_file.display(), e));
            }
        }

        let data_dir = target
            .layout()
            .runtime_path(RuntimeRole::Data)
            .map(|rt| target.runtime_abs(rt))
            .filter(|p| self.fs.exists(p));

        if let Some(owner) = owner {
            let spec = owner.spec();
            if let Some(data) = &data_dir {
                if let Err(e) = self.chown.apply(&spec, data, true) {
                    warnings.push(e.to_string());
                }
            }
            if self.fs.exists(&log_file) {
                if let Err(e) = self.chown.apply(&spec, &log_file, false) {
                    warnings.push(e.to_string());
                }
            }
        }

        for path in data_dir.iter().chain(Some(&log_file)) {
            if !self.fs.exists(path) {
                continue;
            }
            if let Err(e) = self.fs.ensure_owner_writable(path) {
                warnings.push(format!("could not fix mode of {}: {}", path.display(), e));
            }
        }

        for w in &warnings {
            warn!(warning = %w, "permission fix incomplete");
        }
        warnings
    }
}
