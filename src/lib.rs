//! inplace - runtime-preserving update orchestrator
//!
//! inplace replaces the code of an installed web application (backend,
//! frontend, maintenance scripts) with a newer source tree while keeping the
//! installation's runtime state (data directory, secrets file, client
//! configuration) intact. It stops and restarts the application service
//! around the swap and refuses to continue when state would be lost.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

// Re-exports for convenience
pub use application::{CheckUseCase, UpdateOptions, UpdateUseCase};
pub use config::Config;
pub use domain::entities::{DeploymentOutcome, Layout, RunStatus};
pub use domain::value_objects::{Stage, StageStatus, UpdateMode};
pub use error::{InplaceError, InplaceResult};
