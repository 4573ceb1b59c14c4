//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating use cases with infrastructure dependencies
//! - Turning config and flags into run options
//!
//! Rendering lives with the binary (`src/ui`).
//!
//! ## Usage
//!
//! ```ignore
//! use inplace::presentation::factory;
//!
//! let options = factory::build_options(&config, &args, origin)?;
//! let outcome = factory::create_update_use_case(interrupted).execute(&options);
//! ```

pub mod cli;
pub mod factory;

pub use cli::{Cli, ColorWhen, Commands, RunArgs};
pub use factory::{build_options, create_check_use_case, create_update_use_case};
