//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Local file system
//! - `process/` - Host command execution
//! - `tools/` - systemctl, git, pip and chown wrappers
//! - `events/` - Event sinks
//! - `lock` - Installation run lock

pub mod events;
pub mod fs;
pub mod lock;
pub mod process;
pub mod tools;

// Re-export for convenience
pub use events::JsonEventSink;
pub use fs::LocalFs;
pub use lock::RunLock;
pub use process::SystemCommandRunner;
