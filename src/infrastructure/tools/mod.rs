//! Wrappers around the external programs an update drives
//!
//! Each wrapper only builds `CommandSpec`s and interprets results; execution
//! goes through the CommandRunner port so tests can script every call.

mod chown;
mod git;
mod pip;
mod systemctl;

pub use chown::Chown;
pub use git::Git;
pub use pip::Pip;
pub use systemctl::Systemctl;
