//! Terminal UI for the inplace binary
//!
//! - `theme` - colors, icons and borders
//! - `primitives` / `widgets` / `blocks` - building pieces
//! - `views` - per-command rendering
//! - `console` - live stage progress (UpdateEventSink)
//! - `json` - NDJSON helpers for `--json`

pub mod blocks;
pub mod ci;
pub mod console;
pub mod context;
pub mod error;
pub mod json;
pub mod primitives;
pub mod terminal;
pub mod theme;
pub mod views;
pub mod widgets;
