//! Update Use Case Module
//!
//! Runs one runtime-preserving update from source resolution to proxy
//! restart.

mod options;
mod use_case;

#[cfg(test)]
mod tests;

pub use options::{CommandNames, UpdateOptions};
pub use use_case::{ResolvedSource, UpdateUseCase};
