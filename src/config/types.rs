//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::application::{CommandNames, ServiceOwner};
use crate::domain::entities::{CodePath, CodeRole, Layout, PathKind, RuntimePath, RuntimeRole};
use crate::error::InplaceResult;

use super::loader::{self, ConfigWarning};

/// Installation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InstallConfig {
    /// Installation root; required unless given with `--target`
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// Path classification of the installation, relative to the root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_backend")]
    pub backend: PathBuf,
    #[serde(default = "default_frontend")]
    pub frontend: PathBuf,
    /// Optional maintenance-script directory; empty disables it
    #[serde(default = "default_scripts")]
    pub scripts: PathBuf,
    #[serde(default = "default_data")]
    pub data: PathBuf,
    #[serde(default = "default_secrets")]
    pub secrets: PathBuf,
    #[serde(default = "default_client_config")]
    pub client_config: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
    #[serde(default = "default_env")]
    pub env: PathBuf,
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            frontend: default_frontend(),
            scripts: default_scripts(),
            data: default_data(),
            secrets: default_secrets(),
            client_config: default_client_config(),
            log_file: default_log_file(),
            env: default_env(),
            manifest: default_manifest(),
        }
    }
}

fn default_backend() -> PathBuf {
    PathBuf::from("backend")
}

fn default_frontend() -> PathBuf {
    PathBuf::from("frontend")
}

fn default_scripts() -> PathBuf {
    PathBuf::from("scripts")
}

fn default_data() -> PathBuf {
    PathBuf::from("backend/data")
}

fn default_secrets() -> PathBuf {
    PathBuf::from("backend/.env")
}

fn default_client_config() -> PathBuf {
    PathBuf::from("frontend/config.js")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("backend/app.log")
}

fn default_env() -> PathBuf {
    PathBuf::from("venv")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("backend/requirements.txt")
}

impl LayoutConfig {
    /// Build and validate the layout
    pub fn to_layout(&self) -> InplaceResult<Layout> {
        let mut code = vec![
            CodePath {
                role: CodeRole::Backend,
                relative: self.backend.clone(),
                required: true,
            },
            CodePath {
                role: CodeRole::Frontend,
                relative: self.frontend.clone(),
                required: true,
            },
        ];
        if !self.scripts.as_os_str().is_empty() {
            code.push(CodePath {
                role: CodeRole::Scripts,
                relative: self.scripts.clone(),
                required: false,
            });
        }

        let runtime = vec![
            RuntimePath {
                role: RuntimeRole::Data,
                relative: self.data.clone(),
                kind: PathKind::Dir,
            },
            RuntimePath {
                role: RuntimeRole::Secrets,
                relative: self.secrets.clone(),
                kind: PathKind::File,
            },
            RuntimePath {
                role: RuntimeRole::ClientConfig,
                relative: self.client_config.clone(),
                kind: PathKind::File,
            },
        ];

        Layout::new(
            code,
            runtime,
            self.log_file.clone(),
            self.env.clone(),
            self.manifest.clone(),
        )
    }
}

/// Service control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Application unit; empty disables stop/start
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Reverse-proxy unit; empty disables the restart
    #[serde(default = "default_proxy")]
    pub proxy: String,

    /// Owner of runtime state; unset skips chown
    #[serde(default)]
    pub user: Option<String>,

    #[serde(default)]
    pub group: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            proxy: default_proxy(),
            user: None,
            group: None,
        }
    }
}

fn default_service_name() -> String {
    "app".to_string()
}

fn default_proxy() -> String {
    "nginx".to_string()
}

impl ServiceConfig {
    pub fn unit(&self) -> Option<String> {
        non_empty(&self.name)
    }

    pub fn proxy_unit(&self) -> Option<String> {
        non_empty(&self.proxy)
    }

    pub fn owner(&self) -> Option<ServiceOwner> {
        let user = self.user.as_deref().and_then(non_empty)?;
        Some(ServiceOwner {
            user,
            group: self.group.as_deref().and_then(non_empty),
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Source handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Fast-forward pull when the source is a checkout
    #[serde(default = "default_true")]
    pub pull: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { pull: true }
    }
}

fn default_true() -> bool {
    true
}

/// External program names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    #[serde(default = "default_systemctl")]
    pub systemctl: String,
    #[serde(default = "default_git")]
    pub git: String,
    #[serde(default = "default_chown")]
    pub chown: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            systemctl: default_systemctl(),
            git: default_git(),
            chown: default_chown(),
        }
    }
}

fn default_systemctl() -> String {
    "systemctl".to_string()
}

fn default_git() -> String {
    "git".to_string()
}

fn default_chown() -> String {
    "chown".to_string()
}

impl CommandsConfig {
    pub fn to_names(&self) -> CommandNames {
        CommandNames {
            systemctl: self.systemctl.clone(),
            git: self.git.clone(),
            chown: self.chown.clone(),
        }
    }
}

/// Snapshot placement
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SnapshotConfig {
    /// Parent of snapshot holding directories; defaults to `<root>/.inplace`
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub color: ColorMode,

    #[serde(default = "default_true")]
    pub unicode: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::default(),
            unicode: true,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub commands: CommandsConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> InplaceResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> InplaceResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load from the standard locations, then apply environment overrides
    pub fn discover(explicit: Option<&Path>) -> InplaceResult<(Self, Vec<ConfigWarning>)> {
        loader::discover(explicit)
    }

    /// Apply environment variable overrides (INPLACE_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }
}
