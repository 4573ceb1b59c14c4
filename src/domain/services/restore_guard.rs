//! Restore guard
//!
//! Decides, per runtime path, how restore treats it. Loud on ambiguous loss,
//! quiet on a genuine first install.

use std::path::PathBuf;

use crate::domain::entities::{
    EntryState, PathKind, RecordState, RuntimeRole, SnapshotEntry, SnapshotManifest,
};
use crate::domain::value_objects::ContentHash;

/// What restore does with one runtime path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreAction {
    /// Copy the captured content back over whatever code shipped
    Restore,
    /// Current content already equals the captured content
    Unchanged,
    /// First install of a directory: start empty
    Placeholder,
    /// First install of a file: keep what the code tree provides, if anything
    LeaveAsShipped,
}

impl RestoreAction {
    pub fn label(&self) -> &'static str {
        match self {
            RestoreAction::Restore => "restored",
            RestoreAction::Unchanged => "unchanged",
            RestoreAction::Placeholder => "initialized empty",
            RestoreAction::LeaveAsShipped => "left as shipped",
        }
    }
}

/// Runtime state would be lost by continuing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardViolation {
    pub role: RuntimeRole,
    pub relative: PathBuf,
    pub reason: String,
}

/// Check a fresh capture before anything is mutated.
///
/// Returns the first violation found; `decide` applies the same rules per
/// entry at restore time.
pub fn precheck(manifest: &SnapshotManifest, record: &RecordState) -> Result<(), GuardViolation> {
    if manifest.prior_state_seen && manifest.captured_count() == 0 {
        if let Some(entry) = manifest.entries.first() {
            return Err(violation(
                entry,
                "runtime state was present before capture but the snapshot holds nothing",
            ));
        }
    }
    for entry in &manifest.entries {
        check_entry(entry, record)?;
    }
    Ok(())
}

/// Decide the restore action for one entry.
///
/// `kind` comes from the layout, `current` is the hash of what is on disk
/// now (`None` when the path does not exist).
pub fn decide(
    entry: &SnapshotEntry,
    kind: PathKind,
    record: &RecordState,
    current: Option<&ContentHash>,
) -> Result<RestoreAction, GuardViolation> {
    check_entry(entry, record)?;
    match &entry.state {
        EntryState::Captured { hash, .. } => {
            if current == Some(hash) {
                Ok(RestoreAction::Unchanged)
            } else {
                Ok(RestoreAction::Restore)
            }
        }
        EntryState::Absent => Ok(match kind {
            PathKind::Dir => RestoreAction::Placeholder,
            PathKind::File => RestoreAction::LeaveAsShipped,
        }),
        // check_entry rejects these
        EntryState::Unverified { reason } => Err(violation(entry, reason)),
    }
}

fn check_entry(entry: &SnapshotEntry, record: &RecordState) -> Result<(), GuardViolation> {
    match &entry.state {
        EntryState::Captured { .. } => Ok(()),
        EntryState::Unverified { reason } => Err(violation(entry, reason)),
        EntryState::Absent => match record.saw_present(entry.role) {
            Some(false) => Ok(()),
            Some(true) => Err(violation(
                entry,
                "path is missing but the previous run recorded it as present",
            )),
            None => Err(violation(
                entry,
                "path is missing and the install record is unreadable",
            )),
        },
    }
}

fn violation(entry: &SnapshotEntry, reason: &str) -> GuardViolation {
    GuardViolation {
        role: entry.role,
        relative: entry.relative.clone(),
        reason: reason.to_string(),
    }
}
