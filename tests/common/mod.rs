//! Common test utilities for inplace CLI tests.
//!
//! This module provides:
//! - `TestEnv`: an isolated installation, release tree and stub tools in a temp dir
//! - Assertion macros: `assert_file_eq!`, `assert_output_contains!`
//! - Fixtures: reusable file content and stub scripts

#![allow(dead_code)]

pub mod assertions;
pub mod env;
pub mod fixtures;

pub use assertions::*;
pub use env::*;
pub use fixtures::*;
