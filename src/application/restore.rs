//! Restore & Guard
//!
//! Puts captured runtime state back after code replacement. Every entry is
//! judged by the guard before anything is written, so an abort never leaves
//! state half restored.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::application::snapshot::RuntimeSnapshot;
use crate::domain::entities::{
    EntryState, InstallationTarget, RecordState, RuntimeRole, SnapshotEntry,
};
use crate::domain::ports::{FileSystem, FsError, UpdateEvent, UpdateEventSink};
use crate::domain::services::restore_guard::{self, GuardViolation, RestoreAction};

#[derive(Debug)]
pub enum RestoreError {
    /// Continuing would lose state
    Guard(GuardViolation),
    /// Copying state back failed
    Io { path: PathBuf, error: FsError },
}

impl std::fmt::Display for RestoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestoreError::Guard(v) => write!(f, "{}: {}", v.relative.display(), v.reason),
            RestoreError::Io { path, error } => {
                write!(f, "could not restore {}: {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for RestoreError {}

/// What happened to each runtime path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub actions: Vec<(RuntimeRole, PathBuf, RestoreAction)>,
}

impl RestoreReport {
    pub fn summary(&self) -> String {
        let parts = self
            .actions
            .iter()
            .filter(|(_, _, action)| *action != RestoreAction::LeaveAsShipped)
            .map(|(role, _, action)| format!("{} {}", role.name(), action.label()))
            .collect::<Vec<_>>();
        if parts.is_empty() {
            "no runtime state to restore".to_string()
        } else {
            parts.join(", ")
        }
    }
}

pub struct RestoreExecutor<'a, FS: FileSystem + ?Sized> {
    fs: &'a FS,
}

impl<'a, FS: FileSystem + ?Sized> RestoreExecutor<'a, FS> {
    pub fn new(fs: &'a FS) -> Self {
        Self { fs }
    }

    pub fn restore(
        &self,
        target: &InstallationTarget,
        snapshot: &RuntimeSnapshot,
        record: &RecordState,
        sink: &dyn UpdateEventSink,
    ) -> Result<RestoreReport, RestoreError> {
        let mut plan: Vec<(&SnapshotEntry, PathBuf, RestoreAction)> = Vec::new();
        for entry in &snapshot.manifest().entries {
            let Some(runtime) = target.layout().runtime_path(entry.role) else {
                continue;
            };
            let absolute = target.runtime_abs(runtime);
            let current = if self.fs.exists(&absolute) {
                Some(self.fs.hash_tree(&absolute).map_err(|error| RestoreError::Io {
                    path: absolute.clone(),
                    error,
                })?)
            } else {
                None
            };
            let action = restore_guard::decide(entry, runtime.kind, record, current.as_ref())
                .map_err(RestoreError::Guard)?;
            plan.push((entry, absolute, action));
        }

        let mut report = RestoreReport::default();
        for (entry, absolute, action) in plan {
            self.apply(snapshot, entry, &absolute, &action)
                .map_err(|error| RestoreError::Io {
                    path: absolute.clone(),
                    error,
                })?;

            info!(path = %entry.relative.display(), action = action.label(), "runtime path settled");
            if sink.wants_detailed_events() {
                sink.on_event(UpdateEvent::PathRestored {
                    path: entry.relative.clone(),
                    action: action.label().to_string(),
                });
            }
            report
                .actions
                .push((entry.role, entry.relative.clone(), action));
        }
        Ok(report)
    }

    fn apply(
        &self,
        snapshot: &RuntimeSnapshot,
        entry: &SnapshotEntry,
        absolute: &std::path::Path,
        action: &RestoreAction,
    ) -> Result<(), FsError> {
        match action {
            RestoreAction::Restore => {
                let EntryState::Captured { hash, .. } = &entry.state else {
                    return Err(FsError::Other(format!(
                        "{} has no captured copy",
                        entry.relative.display()
                    )));
                };
                self.fs.remove_tree(absolute)?;
                self.fs.copy_tree(&snapshot.slot_path(entry), absolute)?;
                let restored = self.fs.hash_tree(absolute)?;
                if &restored != hash {
                    return Err(FsError::Other(format!(
                        "restored content of {} does not match the snapshot",
                        entry.relative.display()
                    )));
                }
                Ok(())
            }
            RestoreAction::Placeholder => {
                debug!(path = %absolute.display(), "initializing empty runtime directory");
                self.fs.remove_tree(absolute)?;
                self.fs.create_dir_all(absolute)
            }
            RestoreAction::Unchanged | RestoreAction::LeaveAsShipped => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::snapshot::SnapshotStore;
    use crate::domain::entities::Layout;
    use crate::domain::ports::NoopEventSink;
    use crate::infrastructure::fs::LocalFs;
    use tempfile::tempdir;

    fn write(path: &std::path::Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn restore_overwrites_shipped_state() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(&root.join("backend/data/users.json"), "real");
        let fs = LocalFs::new();
        let target = InstallationTarget::new(root, Layout::default());
        let snapshot = SnapshotStore::new(&fs, target.meta_dir())
            .capture(&target, &NoopEventSink)
            .unwrap();

        // fresh code ships its own data directory
        std::fs::remove_dir_all(root.join("backend/data")).unwrap();
        write(&root.join("backend/data/seed.json"), "placeholder");

        let report = RestoreExecutor::new(&fs)
            .restore(&target, &snapshot, &RecordState::Missing, &NoopEventSink)
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(root.join("backend/data/users.json")).unwrap(),
            "real"
        );
        assert!(!root.join("backend/data/seed.json").exists());
        assert!(report.summary().contains("data restored"));
    }

    #[test]
    fn first_install_gets_empty_data_dir() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let fs = LocalFs::new();
        let target = InstallationTarget::new(root, Layout::default());
        let snapshot = SnapshotStore::new(&fs, target.meta_dir())
            .capture(&target, &NoopEventSink)
            .unwrap();

        write(&root.join("backend/data/seed.json"), "shipped");
        write(&root.join("frontend/config.js"), "shipped config");

        RestoreExecutor::new(&fs)
            .restore(&target, &snapshot, &RecordState::Missing, &NoopEventSink)
            .unwrap();

        let data = root.join("backend/data");
        assert!(data.is_dir());
        assert_eq!(std::fs::read_dir(&data).unwrap().count(), 0);
        assert_eq!(
            std::fs::read_to_string(root.join("frontend/config.js")).unwrap(),
            "shipped config"
        );
    }

    #[test]
    fn guard_violation_writes_nothing() {
        use crate::domain::entities::InstallRecord;
        use crate::domain::value_objects::UpdateMode;

        let dir = tempdir().unwrap();
        let root = dir.path();
        write(&root.join("backend/.env"), "KEY=1");
        let fs = LocalFs::new();
        let target = InstallationTarget::new(root, Layout::default());
        let snapshot = SnapshotStore::new(&fs, target.meta_dir())
            .capture(&target, &NoopEventSink)
            .unwrap();

        std::fs::write(root.join("backend/.env"), "KEY=changed").unwrap();
        let mut record = InstallRecord::new(UpdateMode::ExternalUpdate, "/srv");
        record.runtime_present.insert(RuntimeRole::Data);

        let err = RestoreExecutor::new(&fs)
            .restore(
                &target,
                &snapshot,
                &RecordState::Loaded(record),
                &NoopEventSink,
            )
            .unwrap_err();

        assert!(matches!(err, RestoreError::Guard(ref v) if v.role == RuntimeRole::Data));
        assert_eq!(
            std::fs::read_to_string(root.join("backend/.env")).unwrap(),
            "KEY=changed"
        );
    }
}
