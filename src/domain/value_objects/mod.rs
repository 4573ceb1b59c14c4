//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod config_warning;
mod hash;
mod stage;
mod update_mode;

pub use config_warning::ConfigWarning;
pub use hash::{ContentHash, TreeHasher};
pub use stage::{Stage, StageStatus};
pub use update_mode::UpdateMode;
