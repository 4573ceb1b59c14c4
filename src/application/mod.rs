//! Application Layer
//!
//! Use cases that orchestrate an update.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain guard rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `UpdateUseCase` - Runs the stages of one update
//! - `CheckUseCase` - Previews an update without mutation
//!
//! ## Stage executors
//!
//! - `SnapshotStore` - Captures runtime state into a holding directory
//! - `DeploymentExecutor` - Stages and swaps code paths
//! - `RestoreExecutor` - Puts runtime state back under the guard
//! - `PermissionNormalizer` - Keeps state writable by the service user
//! - `DependencyInstaller` / `ServiceController` - pip and systemctl

pub mod check;
pub mod deploy;
pub mod permissions;
pub mod restore;
pub mod services;
pub mod snapshot;
pub mod update;

pub use check::{CheckItem, CheckResult, CheckStatus, CheckUseCase};
pub use deploy::{DeployReport, DeploymentExecutor};
pub use permissions::{PermissionNormalizer, ServiceOwner};
pub use restore::{RestoreError, RestoreExecutor, RestoreReport};
pub use services::{DependencyInstaller, DependencyOutcome, ServiceController};
pub use snapshot::{probe_runtime_paths, PathProbe, RuntimeSnapshot, SnapshotStore};
pub use update::{CommandNames, ResolvedSource, UpdateOptions, UpdateUseCase};
