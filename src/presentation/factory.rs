//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up, and turns
//! configuration plus command-line flags into [`UpdateOptions`].

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::application::{CheckUseCase, UpdateOptions, UpdateUseCase};
use crate::config::Config;
use crate::error::{InplaceError, InplaceResult};
use crate::infrastructure::{LocalFs, SystemCommandRunner};

use super::cli::RunArgs;

/// Type alias for the concrete UpdateUseCase with all dependencies
pub type ConcreteUpdateUseCase = UpdateUseCase<LocalFs, SystemCommandRunner>;

/// Type alias for the concrete CheckUseCase with all dependencies
pub type ConcreteCheckUseCase = CheckUseCase<LocalFs, SystemCommandRunner>;

/// Create an update use case that stops before deployment once `interrupted` is set
pub fn create_update_use_case(interrupted: Arc<AtomicBool>) -> ConcreteUpdateUseCase {
    UpdateUseCase::new(LocalFs::new(), SystemCommandRunner::new()).with_interrupt(interrupted)
}

/// Create a check use case with all dependencies wired up
pub fn create_check_use_case() -> ConcreteCheckUseCase {
    CheckUseCase::new(UpdateUseCase::new(LocalFs::new(), SystemCommandRunner::new()))
}

/// Build run options: flags override config, config overrides defaults.
///
/// `default_origin` is used when `--origin` is absent; the binary passes the
/// directory holding its executable.
pub fn build_options(
    config: &Config,
    args: &RunArgs,
    default_origin: PathBuf,
) -> InplaceResult<UpdateOptions> {
    let target = args
        .target
        .clone()
        .or_else(|| config.install.root.clone())
        .ok_or(InplaceError::MissingTarget)?;
    let origin = args.origin.clone().unwrap_or(default_origin);

    let mut options = UpdateOptions::new(target, origin);
    options.layout = config.layout.to_layout()?;
    options.source = args.source.clone();
    options.pull = config.source.pull && !args.no_pull;
    options.service = match &args.service {
        Some(name) => non_empty(name),
        None => config.service.unit(),
    };
    options.proxy = match &args.proxy {
        Some(name) => non_empty(name),
        None => config.service.proxy_unit(),
    };
    options.owner = config.service.owner();
    options.commands = config.commands.to_names();
    options.snapshot_dir = config.snapshot.dir.clone();

    Ok(options)
}

fn non_empty(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}
