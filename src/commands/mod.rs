//! Command handlers for the inplace binary

pub mod check;
pub mod update;

use std::path::PathBuf;

use anyhow::{Context, Result};

use inplace::config::Config;
use inplace::presentation::{build_options, ColorWhen, RunArgs};
use inplace::UpdateOptions;

use crate::ui::context::UiContext;

/// Loaded config, the resolved run options and the UI settings
pub struct Prepared {
    pub options: UpdateOptions,
    pub ui: UiContext,
}

pub fn prepare(args: &RunArgs, json: bool, verbose: u8, color: Option<ColorWhen>) -> Result<Prepared> {
    let (config, warnings) = Config::discover(args.config.as_deref())?;
    let ui = UiContext::new(json, verbose, color, &config);

    if json {
        for warning in &warnings {
            let _ = crate::ui::json::emit(serde_json::json!({
                "event": "warning",
                "message": warning.message(),
                "key": warning.key,
                "file": warning.file.display().to_string(),
            }));
        }
    } else {
        eprint!(
            "{}",
            crate::ui::blocks::warning::render_config_warnings(&warnings, ui.color, ui.unicode)
        );
    }

    let options = build_options(&config, args, default_origin()?)?;
    Ok(Prepared { options, ui })
}

/// Directory holding the running executable
fn default_origin() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("locating the inplace executable")?;
    match exe.parent() {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir().context("reading the working directory"),
    }
}
