//! Domain Services
//!
//! Pure decisions over domain entities. No I/O; callers supply the facts.

pub mod restore_guard;
mod source_resolver;

pub use restore_guard::{GuardViolation, RestoreAction};
pub use source_resolver::{resolve_source, Resolution};
