//! Event Sink Implementations
//!
//! Provides concrete implementations of UpdateEventSink:
//! - JsonEventSink: NDJSON output for CI/automation
//! - Console progress lives with the terminal UI in the binary

mod json;

pub use json::JsonEventSink;
