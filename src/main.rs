//! inplace CLI - runtime-preserving update orchestrator
//!
//! Usage: inplace [COMMAND] [SOURCE]
//!
//! Commands:
//!   update  Replace the installation's code, keep its runtime state (default)
//!   check   Preview an update without changing anything

use clap::Parser;
use is_terminal::IsTerminal;

use inplace::presentation::{Cli, ColorWhen, Commands};

mod commands;
mod ui;

fn main() {
    let cli = Cli::parse();
    let (json, verbose, color) = (cli.json, cli.verbose, cli.color);

    let log_color = match color {
        Some(ColorWhen::Always) => true,
        Some(ColorWhen::Never) => false,
        _ => std::io::stderr().is_terminal(),
    };
    inplace::logging::init(verbose, log_color);

    let result = match cli.into_command() {
        Commands::Update(args) => commands::update::cmd_update(&args, json, verbose, color),
        Commands::Check(args) => commands::check::cmd_check(&args, json, verbose, color),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            ui::error::print_error(&err, json);
            std::process::exit(ui::error::exit_code(&err));
        }
    }
}
