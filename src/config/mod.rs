//! Configuration module for inplace
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (INPLACE_*)
//! 3. Config file: `--config`, `INPLACE_CONFIG`, `/etc/inplace/config.toml`,
//!    then `<user config dir>/inplace/config.toml`
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use crate::domain::value_objects::ConfigWarning;
pub use loader::{config_candidates, SYSTEM_CONFIG};

pub use types::{
    ColorMode, CommandsConfig, Config, InstallConfig, LayoutConfig, OutputConfig, ServiceConfig,
    SnapshotConfig, SourceConfig,
};
