//! Update Event Port
//!
//! Provides an observable interface for update runs.
//! Enables progress reporting, JSON event streams, and debugging.

use std::path::PathBuf;

use crate::domain::entities::RunStatus;
use crate::domain::value_objects::{Stage, StageStatus, UpdateMode};

/// Event emitted during an update run
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    /// Source resolved and validated
    Resolved {
        mode: UpdateMode,
        source: PathBuf,
        target: PathBuf,
    },

    /// A stage is about to run
    StageStarted { stage: Stage },

    /// A stage finished
    StageFinished {
        stage: Stage,
        status: StageStatus,
        detail: Option<String>,
    },

    /// A runtime path was captured into the snapshot
    PathCaptured { path: PathBuf, present: bool },

    /// A runtime path was put back after deployment
    PathRestored { path: PathBuf, action: String },

    /// Run finished
    Completed { status: RunStatus, exit_code: i32 },
}

/// Trait for receiving update events
///
/// Implementations can be:
/// - ConsoleEventSink: Progress display in terminal
/// - JsonEventSink: NDJSON event stream for CI
/// - NoopEventSink: Silent operation
pub trait UpdateEventSink: Send + Sync {
    /// Handle an update event
    fn on_event(&self, event: UpdateEvent);

    /// Check if this sink wants per-path events
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl UpdateEventSink for NoopEventSink {
    fn on_event(&self, _event: UpdateEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
