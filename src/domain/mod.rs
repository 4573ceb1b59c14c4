//! Domain Layer
//!
//! The rules of a runtime-preserving update, free of process and terminal I/O.
//!
//! ## Structure
//!
//! - `entities/` - Layout, SourceTree, InstallationTarget, snapshot manifest, outcome
//! - `value_objects/` - Immutable value types (ContentHash, Stage, UpdateMode)
//! - `services/` - Pure decisions (source resolution, restore guard)
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **Ports for I/O** - File system and external commands go through traits
//! 2. **Pure decisions** - Services take facts and return verdicts
//! 3. **Ports & Adapters** - Infrastructure supplies the implementations

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
