//! Update Options
//!
//! Everything a run needs, resolved up front. Nothing is read from the
//! ambient environment once a use case starts.

use std::path::PathBuf;

use crate::application::permissions::ServiceOwner;
use crate::domain::entities::Layout;

/// Program names for the external tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandNames {
    pub systemctl: String,
    pub git: String,
    pub chown: String,
}

impl Default for CommandNames {
    fn default() -> Self {
        Self {
            systemctl: "systemctl".to_string(),
            git: "git".to_string(),
            chown: "chown".to_string(),
        }
    }
}

/// Options for the update and check use cases
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// Installation root
    pub target: PathBuf,
    pub layout: Layout,
    /// Directory the orchestrator runs from
    pub origin: PathBuf,
    /// Explicit source tree, if one was given
    pub source: Option<PathBuf>,
    /// Fast-forward pull when the source carries a `.git` marker
    pub pull: bool,
    /// Application service unit; `None` disables service control
    pub service: Option<String>,
    /// Reverse-proxy unit; `None` skips the proxy restart
    pub proxy: Option<String>,
    pub owner: Option<ServiceOwner>,
    pub commands: CommandNames,
    /// Where snapshot holding directories are created; defaults to `<root>/.inplace`
    pub snapshot_dir: Option<PathBuf>,
}

impl UpdateOptions {
    pub fn new(target: impl Into<PathBuf>, origin: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            layout: Layout::default(),
            origin: origin.into(),
            source: None,
            pull: true,
            service: None,
            proxy: None,
            owner: None,
            commands: CommandNames::default(),
            snapshot_dir: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn without_pull(mut self) -> Self {
        self.pull = false;
        self
    }
}
