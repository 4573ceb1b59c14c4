//! Domain Entities
//!
//! Core domain entities that have identity and lifecycle.
//! - `Layout` - Which installation paths are code and which are runtime state
//! - `SourceTree` - A candidate tree of deployable code
//! - `InstallationTarget` - The long-lived deployment root
//! - `SnapshotManifest` - What a runtime-state capture found
//! - `InstallRecord` - Evidence left behind by earlier runs
//! - `DeploymentOutcome` - The stage-by-stage report of one run

mod install_record;
mod installation;
mod layout;
mod manifest;
mod outcome;
mod snapshot;
mod source_tree;

pub use install_record::{InstallRecord, RecordState, RECORD_VERSION};
pub use installation::{InstallationTarget, META_DIR};
pub use layout::{CodePath, CodeRole, Layout, PathClass, PathKind, RuntimePath, RuntimeRole};
pub use manifest::{DependencyManifest, Requirement};
pub use outcome::{
    AbortReason, DeploymentOutcome, OutcomeBuilder, RunStatus, ServiceStatus, StageRecord,
};
pub use snapshot::{EntryState, SnapshotEntry, SnapshotManifest};
pub use source_tree::{SourceTree, VCS_MARKER};
