//! Snapshot Store
//!
//! Copies every runtime-state path into a private holding directory before
//! code is replaced. The holding directory is a `TempDir`, so it is removed
//! on every exit path unless it is explicitly retained.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::domain::entities::{
    EntryState, InstallationTarget, PathKind, RuntimeRole, SnapshotEntry, SnapshotManifest,
};
use crate::domain::ports::{FileSystem, FsError, UpdateEvent, UpdateEventSink};
use crate::error::InplaceResult;

/// What a runtime path looked like before anything was copied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathProbe {
    pub role: RuntimeRole,
    pub relative: PathBuf,
    pub absolute: PathBuf,
    pub exists: bool,
    pub has_content: bool,
}

/// Probe every runtime path of `target`
pub fn probe_runtime_paths<FS: FileSystem + ?Sized>(
    fs: &FS,
    target: &InstallationTarget,
) -> Vec<PathProbe> {
    target
        .layout()
        .runtime_paths()
        .iter()
        .map(|rt| {
            let absolute = target.runtime_abs(rt);
            PathProbe {
                role: rt.role,
                relative: rt.relative.clone(),
                exists: fs.exists(&absolute),
                has_content: fs.has_content(&absolute),
                absolute,
            }
        })
        .collect()
}

/// A captured copy of runtime state, owned by the current run
#[derive(Debug)]
pub struct RuntimeSnapshot {
    holding: Option<TempDir>,
    path: PathBuf,
    manifest: SnapshotManifest,
}

impl RuntimeSnapshot {
    /// Holding directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn manifest(&self) -> &SnapshotManifest {
        &self.manifest
    }

    /// Where the copy of `entry` lives inside the holding directory
    pub fn slot_path(&self, entry: &SnapshotEntry) -> PathBuf {
        self.path.join(&entry.slot)
    }

    /// Delete the holding directory now instead of on drop
    pub fn release(mut self) -> std::io::Result<()> {
        match self.holding.take() {
            Some(dir) => {
                debug!(path = %self.path.display(), "releasing snapshot");
                dir.close()
            }
            None => Ok(()),
        }
    }

    /// Keep the holding directory on disk and return its path
    pub fn retain(mut self) -> PathBuf {
        if let Some(dir) = self.holding.take() {
            let kept = dir.keep();
            warn!(path = %kept.display(), "snapshot retained on disk");
        }
        self.path.clone()
    }
}

/// Creates snapshots under a base directory
pub struct SnapshotStore<'a, FS: FileSystem + ?Sized> {
    fs: &'a FS,
    base_dir: PathBuf,
}

impl<'a, FS: FileSystem + ?Sized> SnapshotStore<'a, FS> {
    pub fn new(fs: &'a FS, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            base_dir: base_dir.into(),
        }
    }

    /// Capture every runtime path of `target`.
    ///
    /// Absent paths are recorded, not errors. A copy that cannot be verified
    /// against its original is recorded as `Unverified`; the guard decides
    /// what that means. I/O errors while copying fail the capture.
    pub fn capture(
        &self,
        target: &InstallationTarget,
        sink: &dyn UpdateEventSink,
    ) -> InplaceResult<RuntimeSnapshot> {
        let probes = probe_runtime_paths(self.fs, target);
        let prior_state_seen = probes.iter().any(|p| p.has_content);

        self.fs.create_dir_all(&self.base_dir)?;
        // TempDir is created with owner-only permissions on Unix
        let holding = tempfile::Builder::new()
            .prefix("snapshot-")
            .tempdir_in(&self.base_dir)
            .map_err(|e| FsError::io(&self.base_dir, e))?;
        let path = holding.path().to_path_buf();
        debug!(path = %path.display(), "snapshot holding directory created");

        let mut entries = Vec::with_capacity(probes.len());
        for probe in probes {
            let slot = probe.role.name().to_string();
            let state = if probe.exists {
                self.capture_one(&probe.absolute, &path.join(&slot))?
            } else {
                EntryState::Absent
            };

            if sink.wants_detailed_events() {
                sink.on_event(UpdateEvent::PathCaptured {
                    path: probe.relative.clone(),
                    present: probe.exists,
                });
            }
            match &state {
                EntryState::Captured { .. } => {
                    info!(path = %probe.relative.display(), "captured runtime state")
                }
                EntryState::Absent => {
                    debug!(path = %probe.relative.display(), "runtime path absent")
                }
                EntryState::Unverified { reason } => {
                    warn!(path = %probe.relative.display(), %reason, "capture not verified")
                }
            }

            entries.push(SnapshotEntry {
                role: probe.role,
                relative: probe.relative,
                slot,
                state,
            });
        }

        Ok(RuntimeSnapshot {
            holding: Some(holding),
            path,
            manifest: SnapshotManifest {
                taken_at: Utc::now(),
                prior_state_seen,
                entries,
            },
        })
    }

    fn capture_one(&self, original: &Path, slot: &Path) -> InplaceResult<EntryState> {
        let kind = if self.fs.is_dir(original) {
            PathKind::Dir
        } else {
            PathKind::File
        };
        let expected = self.fs.hash_tree(original)?;
        self.fs.copy_tree(original, slot)?;

        if !self.fs.exists(slot) {
            return Ok(EntryState::Unverified {
                reason: "holding copy is missing after capture".to_string(),
            });
        }
        let actual = self.fs.hash_tree(slot)?;
        if actual != expected {
            return Ok(EntryState::Unverified {
                reason: "holding copy differs from the original".to_string(),
            });
        }
        Ok(EntryState::Captured {
            hash: expected,
            kind,
        })
    }
}
