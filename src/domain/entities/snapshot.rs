//! Snapshot manifest: what a capture found and what it holds.
//!
//! The holding directory itself is owned by `application::snapshot`; this is
//! the pure record the guard reasons about.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::layout::{PathKind, RuntimeRole};
use crate::domain::value_objects::ContentHash;

/// Capture result for one runtime path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryState {
    /// Copied and verified against the original.
    Captured { hash: ContentHash, kind: PathKind },
    /// The path did not exist when capture started.
    Absent,
    /// The path existed but the holding copy is missing or differs.
    Unverified { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    pub role: RuntimeRole,
    /// Path relative to the installation root
    pub relative: PathBuf,
    /// File name of the copy inside the holding directory
    pub slot: String,
    pub state: EntryState,
}

impl SnapshotEntry {
    pub fn is_captured(&self) -> bool {
        matches!(self.state, EntryState::Captured { .. })
    }

    pub fn hash(&self) -> Option<&ContentHash> {
        match &self.state {
            EntryState::Captured { hash, .. } => Some(hash),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotManifest {
    pub taken_at: DateTime<Utc>,
    /// Some runtime path existed with content before copying began.
    pub prior_state_seen: bool,
    pub entries: Vec<SnapshotEntry>,
}

impl SnapshotManifest {
    pub fn entry(&self, role: RuntimeRole) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.role == role)
    }

    pub fn captured_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_captured()).count()
    }

    pub fn summary(&self) -> String {
        let captured = self
            .entries
            .iter()
            .filter(|e| e.is_captured())
            .map(|e| e.role.name())
            .collect::<Vec<_>>();
        if captured.is_empty() {
            "no runtime state present".to_string()
        } else {
            format!("captured {}", captured.join(", "))
        }
    }
}
