//! JSON Event Sink
//!
//! Outputs update events as NDJSON for CI/automation consumption.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{UpdateEvent, UpdateEventSink};

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer (for testing)
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

impl UpdateEventSink for JsonEventSink {
    fn on_event(&self, event: UpdateEvent) {
        let json = match event {
            UpdateEvent::Resolved {
                mode,
                source,
                target,
            } => {
                serde_json::json!({
                    "event": "start",
                    "command": "update",
                    "mode": mode,
                    "source": source.display().to_string(),
                    "target": target.display().to_string(),
                })
            }

            UpdateEvent::StageStarted { stage } => {
                serde_json::json!({
                    "event": "stage_start",
                    "command": "update",
                    "stage": stage,
                })
            }

            UpdateEvent::StageFinished {
                stage,
                status,
                detail,
            } => {
                serde_json::json!({
                    "event": "stage_end",
                    "command": "update",
                    "stage": stage,
                    "status": status,
                    "detail": detail,
                })
            }

            UpdateEvent::PathCaptured { path, present } => {
                serde_json::json!({
                    "event": "path_captured",
                    "command": "update",
                    "path": path.display().to_string(),
                    "present": present,
                })
            }

            UpdateEvent::PathRestored { path, action } => {
                serde_json::json!({
                    "event": "path_restored",
                    "command": "update",
                    "path": path.display().to_string(),
                    "action": action,
                })
            }

            UpdateEvent::Completed { status, exit_code } => {
                serde_json::json!({
                    "event": "complete",
                    "command": "update",
                    "status": status,
                    "exit_code": exit_code,
                })
            }
        };

        self.write_event(json);
    }
}
