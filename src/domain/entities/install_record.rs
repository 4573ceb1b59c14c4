//! Install record persisted between runs
//!
//! Stored in `<root>/.inplace/record.json` after every run that restored
//! runtime state. It tells a genuine first install apart from state that
//! vanished since the last update.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::layout::RuntimeRole;
use crate::domain::ports::{FileSystem, FsResult};
use crate::domain::value_objects::UpdateMode;

pub const RECORD_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    pub version: u32,
    pub completed_at: DateTime<Utc>,
    pub mode: UpdateMode,
    pub source: PathBuf,
    /// Runtime paths that existed when the run finished restoring
    #[serde(default)]
    pub runtime_present: BTreeSet<RuntimeRole>,
}

/// What the previous runs left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordState {
    /// No record: never installed by this tool, or installed before it existed
    Missing,
    Loaded(InstallRecord),
    /// A record exists but cannot be read; the installation is not fresh
    Unreadable(String),
}

impl RecordState {
    pub fn load<FS: FileSystem + ?Sized>(fs: &FS, path: &Path) -> Self {
        if !fs.exists(path) {
            return RecordState::Missing;
        }
        match fs.read(path) {
            Ok(content) => match serde_json::from_str::<InstallRecord>(&content) {
                Ok(record) => RecordState::Loaded(record),
                Err(e) => RecordState::Unreadable(e.to_string()),
            },
            Err(e) => RecordState::Unreadable(e.to_string()),
        }
    }

    /// Whether an earlier run saw this runtime path present
    pub fn saw_present(&self, role: RuntimeRole) -> Option<bool> {
        match self {
            RecordState::Missing => Some(false),
            RecordState::Loaded(record) => Some(record.runtime_present.contains(&role)),
            RecordState::Unreadable(_) => None,
        }
    }
}

impl InstallRecord {
    pub fn new(mode: UpdateMode, source: impl Into<PathBuf>) -> Self {
        Self {
            version: RECORD_VERSION,
            completed_at: Utc::now(),
            mode,
            source: source.into(),
            runtime_present: BTreeSet::new(),
        }
    }

    pub fn save<FS: FileSystem + ?Sized>(&self, fs: &FS, path: &Path) -> FsResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| crate::domain::ports::FsError::Other(e.to_string()))?;
        fs.write(path, &content)
    }
}
