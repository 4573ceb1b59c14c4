//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod command_runner;
pub mod file_system;
pub mod update_events;

pub use command_runner::{CommandError, CommandOutput, CommandRunner, CommandSpec};
pub use file_system::{FileSystem, FsError, FsResult};
pub use update_events::{NoopEventSink, UpdateEvent, UpdateEventSink};
