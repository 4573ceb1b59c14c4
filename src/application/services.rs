//! Dependency & Service Controller
//!
//! Thin policy over `systemctl` and `pip`: which failures matter is decided
//! by the update use case, not here.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::domain::entities::{DependencyManifest, InstallationTarget, ServiceStatus};
use crate::domain::ports::{CommandError, CommandRunner, FileSystem};
use crate::infrastructure::tools::{Pip, Systemctl};

/// Result of the dependency step when no command failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyOutcome {
    Installed { packages: usize },
    /// The dependency environment has not been created yet
    NoEnvironment(PathBuf),
    NoManifest(PathBuf),
}

impl DependencyOutcome {
    pub fn detail(&self) -> String {
        match self {
            DependencyOutcome::Installed { packages } => {
                format!("installed {} packages", packages)
            }
            DependencyOutcome::NoEnvironment(path) => {
                format!("no dependency environment at {}; skipped", path.display())
            }
            DependencyOutcome::NoManifest(path) => {
                format!("no manifest at {}; skipped", path.display())
            }
        }
    }

    pub fn is_skip(&self) -> bool {
        !matches!(self, DependencyOutcome::Installed { .. })
    }
}

pub struct DependencyInstaller<'a, FS: FileSystem + ?Sized> {
    fs: &'a FS,
    runner: &'a dyn CommandRunner,
}

impl<'a, FS: FileSystem + ?Sized> DependencyInstaller<'a, FS> {
    pub fn new(fs: &'a FS, runner: &'a dyn CommandRunner) -> Self {
        Self { fs, runner }
    }

    pub fn install(&self, target: &InstallationTarget) -> Result<DependencyOutcome, CommandError> {
        let env = target.dependency_env();
        if !self.fs.is_dir(&env) {
            warn!(path = %env.display(), "dependency environment missing");
            return Ok(DependencyOutcome::NoEnvironment(env));
        }
        let manifest = target.manifest();
        if !self.fs.exists(&manifest) {
            warn!(path = %manifest.display(), "dependency manifest missing");
            return Ok(DependencyOutcome::NoManifest(manifest));
        }

        let packages = self
            .fs
            .read(&manifest)
            .map(|content| DependencyManifest::parse(&content).len())
            .unwrap_or(0);

        Pip::in_env(self.runner, &env).install_requirements(&manifest)?;
        info!(packages, "dependencies installed");
        Ok(DependencyOutcome::Installed { packages })
    }
}

/// The application service and the reverse proxy in front of it
pub struct ServiceController<'a> {
    systemctl: Systemctl<'a>,
    service: Option<String>,
    proxy: Option<String>,
}

impl<'a> ServiceController<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        systemctl_program: &str,
        service: Option<String>,
        proxy: Option<String>,
    ) -> Self {
        Self {
            systemctl: Systemctl::new(runner, systemctl_program),
            service,
            proxy,
        }
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn status(&self) -> ServiceStatus {
        let Some(service) = self.service() else {
            return ServiceStatus::NotManaged;
        };
        match self.systemctl.is_active(service) {
            Ok(true) => ServiceStatus::Running,
            Ok(false) => ServiceStatus::Stopped,
            Err(e) => {
                warn!(%service, error = %e, "could not query service state");
                ServiceStatus::Unknown
            }
        }
    }

    /// Stop the service; `None` when no service is managed
    pub fn stop(&self) -> Option<Result<(), CommandError>> {
        self.service().map(|s| self.systemctl.stop(s))
    }

    pub fn start(&self) -> Option<Result<(), CommandError>> {
        self.service().map(|s| self.systemctl.start(s))
    }

    pub fn restart_proxy(&self) -> Option<Result<(), CommandError>> {
        self.proxy().map(|p| self.systemctl.restart(p))
    }
}
